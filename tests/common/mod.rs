#![allow(dead_code)]

pub mod requests {
    use http::{Method, Request};

    pub fn empty(method: Method, uri: &str) -> Request<Vec<u8>> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Vec::new())
            .unwrap()
    }

    /// Request with a body and `(name, value)` headers.
    pub fn with_body(
        method: Method,
        uri: &str,
        headers: &[(&str, &str)],
        body: Vec<u8>,
    ) -> Request<Vec<u8>> {
        let mut builder = Request::builder().method(method).uri(uri);
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(body).unwrap()
    }
}

pub mod mock_peer {
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{SocketAddr, TcpListener};
    use std::thread::{self, JoinHandle};

    /// What the mock peer saw.
    #[derive(Debug, Default)]
    pub struct Recorded {
        pub request_line: String,
        pub headers: Vec<(String, String)>,
        pub body: Vec<u8>,
    }

    impl Recorded {
        pub fn header(&self, name: &str) -> Option<&str> {
            self.headers
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        }
    }

    /// Accept one connection, record the request and answer with the given
    /// status line, content type and body.
    pub fn serve_once(
        status_line: &'static str,
        content_type: &'static str,
        body: Vec<u8>,
    ) -> (SocketAddr, JoinHandle<Recorded>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut recorded = Recorded::default();

            reader.read_line(&mut recorded.request_line).unwrap();
            recorded.request_line = recorded.request_line.trim_end().to_string();
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                let line = line.trim_end();
                if line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    recorded
                        .headers
                        .push((name.trim().to_string(), value.trim().to_string()));
                }
            }

            let length: usize = recorded
                .header("content-length")
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            recorded.body = vec![0; length];
            reader.read_exact(&mut recorded.body).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status_line}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(&body).unwrap();
            stream.flush().unwrap();
            recorded
        });
        (addr, handle)
    }
}
