use super::request::IncomingRequest;
use super::response::{write_text_error, Response};
use crate::codec::{ApiError, SerializerRegistry};
use crate::ids::RequestId;
use crate::router::PathVars;
use http::header::{ACCEPT, CONTENT_TYPE};
use http::StatusCode;
use serde::Serialize;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Per-attempt request scratch space.
///
/// A fresh `Context` is built for every route tried against a request, so
/// path variables extracted by one route never leak into the next.
pub struct Context {
    request: Arc<IncomingRequest>,
    registry: Arc<SerializerRegistry>,
    request_id: RequestId,
    path_vars: Option<PathVars>,
    vars: HashMap<String, Box<dyn Any + Send + Sync>>,
}

impl Context {
    #[must_use]
    pub fn new(
        request: Arc<IncomingRequest>,
        registry: Arc<SerializerRegistry>,
        request_id: RequestId,
    ) -> Self {
        Self {
            request,
            registry,
            request_id,
            path_vars: None,
            vars: HashMap::new(),
        }
    }

    #[must_use]
    pub fn request(&self) -> &IncomingRequest {
        &self.request
    }

    /// Shared handle on the request, for thunks that outlive the context.
    #[must_use]
    pub fn request_arc(&self) -> Arc<IncomingRequest> {
        Arc::clone(&self.request)
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SerializerRegistry> {
        &self.registry
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Variables extracted by the path filter; `None` until a path filter accepts.
    #[must_use]
    pub fn path_vars(&self) -> Option<&PathVars> {
        self.path_vars.as_ref()
    }

    #[must_use]
    pub fn path_var(&self, name: &str) -> Option<&str> {
        self.path_vars.as_ref().and_then(|vars| vars.get(name))
    }

    pub(crate) fn set_path_vars(&mut self, vars: PathVars) {
        self.path_vars = Some(vars);
    }

    /// Store a user-defined value, e.g. from a custom filter.
    pub fn set_var<T: Any + Send + Sync>(&mut self, name: impl Into<String>, value: T) {
        self.vars.insert(name.into(), Box::new(value));
    }

    /// Fetch a user-defined value if it exists and has type `T`.
    #[must_use]
    pub fn var<T: Any + Send + Sync>(&self, name: &str) -> Option<&T> {
        self.vars.get(name).and_then(|v| v.downcast_ref::<T>())
    }

    /// Pick the content type for this request.
    ///
    /// Uses `Accept`; when that is missing, empty or `*/*`, falls back to
    /// `default`, and without a default to the request's `Content-Type`.
    #[must_use]
    pub fn infer_content_type(&self, default: Option<&str>) -> String {
        let accept = self.request.header(ACCEPT.as_str()).unwrap_or("");
        if !accept.is_empty() && accept != "*/*" {
            return accept.to_string();
        }
        match default {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => self
                .request
                .header(CONTENT_TYPE.as_str())
                .unwrap_or("")
                .to_string(),
        }
    }

    /// Encode `value` in the negotiated content type.
    ///
    /// If the negotiated type has no codec, a JSON 400 body is written
    /// instead and the deviation is logged.
    pub fn api_response<T>(&self, status: StatusCode, value: T) -> Response
    where
        T: Serialize + 'static,
    {
        let content_type = self.infer_content_type(Some(self.registry.default_content_type()));
        let registry = Arc::clone(&self.registry);
        let request_id = self.request_id;
        Response::new(move |sink| {
            if let Err(e) = registry.encode_response(sink, status, &content_type, &value) {
                warn!(
                    request_id = %request_id,
                    content_type = %content_type,
                    error = %e,
                    "Response encoding deviated from request"
                );
            }
        })
    }

    /// Structured `{status, error}` response in the negotiated content type.
    pub fn api_error(&self, status: StatusCode, error: impl Into<String>) -> Response {
        self.api_response(
            status,
            ApiError {
                status: status.as_u16(),
                error: error.into(),
            },
        )
    }

    /// Plain-text error response.
    pub fn error(&self, status: StatusCode, message: impl Into<String>) -> Response {
        let message = message.into();
        Response::new(move |sink| write_text_error(sink, status, &message))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("request_id", &self.request_id)
            .field("method", self.request.method())
            .field("path", &self.request.path())
            .field("path_vars", &self.path_vars)
            .field("vars", &self.vars.keys().collect::<Vec<_>>())
            .finish()
    }
}
