use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, StatusCode};
use std::fmt;
use std::io::{self, Write};
use tracing::warn;

/// Outgoing side of a request, provided by the host server.
///
/// Headers and status must be set before the first body byte is written.
pub trait ResponseSink: Write {
    fn set_status(&mut self, status: StatusCode);
    fn headers_mut(&mut self) -> &mut HeaderMap;
}

/// In-memory [`ResponseSink`], convertible into an `http::Response`.
#[derive(Debug, Clone, Default)]
pub struct BufferedResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Vec<u8>,
}

impl BufferedResponse {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn into_http(self) -> http::Response<Vec<u8>> {
        let mut response = http::Response::new(self.body);
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

impl Write for BufferedResponse {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.body.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl ResponseSink for BufferedResponse {
    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }
}

type WriteThunk = Box<dyn FnOnce(&mut dyn ResponseSink)>;

/// A pending response.
///
/// Building a `Response` writes nothing; the bytes reach the sink only when
/// the dispatch loop calls [`Response::write`], which consumes the value.
/// Headers added with [`Response::header`] are flushed right before the thunk runs.
#[must_use = "a Response does nothing until it is written"]
pub struct Response {
    headers: HeaderMap,
    thunk: WriteThunk,
}

impl Response {
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce(&mut dyn ResponseSink) + 'static,
    {
        Self {
            headers: HeaderMap::new(),
            thunk: Box::new(thunk),
        }
    }

    /// Add a header to be sent with this response.
    ///
    /// Invalid header names or values are dropped with a warning.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => warn!(header = %name, "Dropping invalid response header"),
        }
        self
    }

    pub fn content_type(self, content_type: &str) -> Self {
        self.header(CONTENT_TYPE.as_str(), content_type)
    }

    /// Flush headers and run the write thunk against `sink`.
    pub fn write(self, sink: &mut dyn ResponseSink) {
        let headers = sink.headers_mut();
        for (name, value) in &self.headers {
            headers.append(name.clone(), value.clone());
        }
        (self.thunk)(sink);
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// Write a plain-text error body.
pub fn write_text_error(sink: &mut dyn ResponseSink, status: StatusCode, message: &str) {
    let headers = sink.headers_mut();
    headers.insert(
        CONTENT_TYPE,
        HeaderValue::from_static("text/plain; charset=utf-8"),
    );
    headers.insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    sink.set_status(status);
    if let Err(e) = writeln!(sink, "{message}") {
        warn!(error = %e, "Failed to write error body");
    }
}
