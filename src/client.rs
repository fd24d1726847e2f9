//! Reverse-routing HTTP client.
//!
//! A [`Client`] calls endpoints of a remote service by route name: the
//! route's path template is reversed with the call's arguments, its single
//! method is used, and bodies travel in the client's encoding in both
//! directions.
//!
//! ```rust,no_run
//! use pathways::client::{Args, Client};
//! use pathways::codec::JSON;
//! use pathways::router::Service;
//! use std::sync::Arc;
//!
//! let mut service = Service::new("/api");
//! service.path("/items/{id}").name("GetItem").get();
//!
//! let client = Client::new(Arc::new(service), "http://127.0.0.1:8080", JSON);
//! let args = Args::from([("id".to_string(), "42".to_string())]);
//! let item: String = client.call("GetItem", &args, &()).expect("call failed");
//! ```

use crate::codec::SerializerRegistry;
use crate::error::ClientError;
use crate::router::Service;
use http::header::{ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path bindings for a call.
pub type Args = HashMap<String, String>;

/// Client for the named routes of a [`Service`].
#[derive(Debug, Clone)]
pub struct Client {
    service: Arc<Service>,
    registry: Arc<SerializerRegistry>,
    base_url: String,
    encoding: String,
    http: reqwest::blocking::Client,
}

impl Client {
    /// Create a client sending requests to `base_url` in `encoding`.
    ///
    /// Codecs come from the service's registry.
    #[must_use]
    pub fn new(service: Arc<Service>, base_url: &str, encoding: &str) -> Self {
        let registry = Arc::clone(service.registry());
        Self {
            service,
            registry,
            base_url: base_url.trim_end_matches('/').to_string(),
            encoding: encoding.to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, TLS roots).
    #[must_use]
    pub fn with_http_client(mut self, http: reqwest::blocking::Client) -> Self {
        self.http = http;
        self
    }

    #[must_use]
    pub fn encoding(&self) -> &str {
        &self.encoding
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for route `name` without sending it.
    ///
    /// Both `Content-Type` and `Accept` are set to the client's encoding.
    ///
    /// # Errors
    ///
    /// [`ClientError::NoSuchRoute`], [`ClientError::Config`] when the route
    /// does not have exactly one method, or [`ClientError::Transport`] for an
    /// unusable URL.
    pub fn make_request(
        &self,
        name: &str,
        args: &Args,
        body: Option<Vec<u8>>,
    ) -> Result<reqwest::blocking::Request, ClientError> {
        let route = self
            .service
            .find(name)
            .ok_or_else(|| ClientError::NoSuchRoute(name.to_string()))?;
        let url = format!("{}{}", self.base_url, route.reverse(args));
        let method = route.try_method()?;

        let mut builder = self
            .http
            .request(method, &url)
            .header(CONTENT_TYPE, self.encoding.as_str())
            .header(ACCEPT, self.encoding.as_str());
        if let Some(body) = body {
            builder = builder.body(body);
        }
        Ok(builder.build()?)
    }

    /// Call route `name` with `request` as the body and decode the response.
    ///
    /// # Errors
    ///
    /// Everything [`Client::make_request`] returns, plus
    /// [`ClientError::Codec`] for encode/decode failures,
    /// [`ClientError::Status`] for a non-2xx answer and
    /// [`ClientError::UnexpectedContentType`] when the answer is not in the
    /// client's encoding.
    pub fn call<Req, Resp>(&self, name: &str, args: &Args, request: &Req) -> Result<Resp, ClientError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut body = Vec::new();
        self.registry.encode(&self.encoding, &mut body, request)?;

        let req = self.make_request(name, args, Some(body))?;
        let url = req.url().to_string();
        debug!(route = %name, method = %req.method(), url = %url, "Client call");

        let response = self.http.execute(req)?;
        let status = response.status();
        if !status.is_success() {
            warn!(route = %name, url = %url, status = status.as_u16(), "Client call failed");
            return Err(ClientError::Status {
                status,
                message: format!("HTTP error ({}): {}", status.as_u16(), status),
            });
        }

        let found = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        if !found.starts_with(&self.encoding) {
            return Err(ClientError::UnexpectedContentType {
                expected: self.encoding.clone(),
                url,
                found,
            });
        }

        let bytes = response.bytes()?;
        Ok(self.registry.decode(&self.encoding, &bytes[..])?)
    }
}
