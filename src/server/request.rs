use http::{HeaderMap, Method, Uri};
use std::io::Read;
use tracing::debug;

/// Query parameters in the order they appear in the query string.
///
/// A name may repeat (`?tag=a&tag=b`); all of its values are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    /// Parse a raw query string (without the leading `?`), URL-decoding names and values.
    #[must_use]
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// First value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Every value bound to `name`, in query-string order.
    pub fn values<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// An inbound request as seen by the routing engine.
///
/// The host server owns the socket; it hands the engine the method, target,
/// headers and the buffered body. The query string is parsed once here so
/// that every query filter tried against the request shares the result.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    query: QueryParams,
    body: Vec<u8>,
}

impl IncomingRequest {
    #[must_use]
    pub fn new(method: Method, uri: Uri, headers: HeaderMap, body: Vec<u8>) -> Self {
        let query = uri.query().map(QueryParams::parse).unwrap_or_default();
        debug!(
            method = %method,
            path = %uri.path(),
            header_count = headers.len(),
            query_count = query.len(),
            body_size_bytes = body.len(),
            "Request received"
        );
        Self {
            method,
            uri,
            headers,
            query,
            body,
        }
    }

    /// Read the whole body from `reader` and build the request.
    ///
    /// # Errors
    ///
    /// Returns the I/O error of the underlying reader.
    pub fn from_reader<R: Read>(
        method: Method,
        uri: Uri,
        headers: HeaderMap,
        mut reader: R,
    ) -> std::io::Result<Self> {
        let mut body = Vec::new();
        reader.read_to_end(&mut body)?;
        Ok(Self::new(method, uri, headers, body))
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request path without the query string.
    #[must_use]
    pub fn path(&self) -> &str {
        self.uri.path()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if present and valid UTF-8.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    #[must_use]
    pub fn query(&self) -> &QueryParams {
        &self.query
    }

    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }
}

impl From<http::Request<Vec<u8>>> for IncomingRequest {
    fn from(request: http::Request<Vec<u8>>) -> Self {
        let (parts, body) = request.into_parts();
        Self::new(parts.method, parts.uri, parts.headers, body)
    }
}
