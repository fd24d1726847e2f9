use super::filters::{Filter, HeaderMatch, MethodMatch, PathMatch, QueryMatch, StageAcceptor};
use super::pattern::PathPattern;
use crate::codec::SerializerRegistry;
use crate::dispatcher::{from_fn, from_handler, Action, Handler, NotFound};
use crate::error::ConfigError;
use crate::ids::RequestId;
use crate::server::{
    write_text_error, BufferedResponse, Context, IncomingRequest, Response, ResponseSink,
};
use crate::typed::{self, TypeDescriptor};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// Unwrap a setup result, panicking with the configuration error's message.
pub(crate) fn or_panic<T>(result: Result<T, ConfigError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => panic!("{e}"),
    }
}

/// A named endpoint: an ordered filter chain plus the action run when every
/// filter accepts.
///
/// Routes are built through [`Service::path`](super::Service::path) and
/// configured with chained calls:
///
/// ```rust
/// use pathways::router::Service;
/// use http::StatusCode;
///
/// let mut service = Service::new("/api");
/// service
///     .path("/items/{id}")
///     .name("GetItem")
///     .get()
///     .action(|cx| {
///         let id = cx.path_var("id").unwrap_or_default().to_string();
///         cx.api_response(StatusCode::OK, id)
///     });
/// ```
pub struct Route {
    name: Option<String>,
    path: String,
    filters: Vec<Filter>,
    path_match: Arc<PathMatch>,
    method_match: Option<MethodMatch>,
    action: Option<Action>,
    request_type: Option<TypeDescriptor>,
    response_type: Option<TypeDescriptor>,
}

impl Route {
    /// Create a route whose first filter matches `path`.
    ///
    /// # Panics
    ///
    /// If the template does not compile; see [`Route::try_new`].
    #[must_use]
    pub fn new(path: &str) -> Self {
        or_panic(Self::try_new(path))
    }

    /// # Errors
    ///
    /// See [`PathPattern::compile`].
    pub fn try_new(path: &str) -> Result<Self, ConfigError> {
        let path_match = Arc::new(PathMatch::new(path)?);
        Ok(Self {
            name: None,
            path: path.to_string(),
            filters: vec![Filter::Path(Arc::clone(&path_match))],
            path_match,
            method_match: None,
            action: None,
            request_type: None,
            response_type: None,
        })
    }

    /// Append a filter. Filters run in the order they were added.
    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Append a user-defined predicate.
    pub fn custom_filter<S: StageAcceptor + 'static>(&mut self, acceptor: S) -> &mut Self {
        self.filter(Filter::custom(acceptor))
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    /// Restrict the route to `methods`.
    ///
    /// Calling this again adds another method filter; the latest set is the
    /// one reported by [`Route::method`].
    pub fn methods<I>(&mut self, methods: I) -> &mut Self
    where
        I: IntoIterator<Item = Method>,
    {
        let matcher = MethodMatch::new(methods);
        self.method_match = Some(matcher.clone());
        self.filter(Filter::Methods(matcher))
    }

    pub fn get(&mut self) -> &mut Self {
        self.methods([Method::GET])
    }

    pub fn post(&mut self) -> &mut Self {
        self.methods([Method::POST])
    }

    pub fn put(&mut self) -> &mut Self {
        self.methods([Method::PUT])
    }

    pub fn delete(&mut self) -> &mut Self {
        self.methods([Method::DELETE])
    }

    /// Require header `name` to match `pattern`,
    /// e.g. `route.header("Content-Type", "application/json|application/x-msgpack")`.
    ///
    /// # Panics
    ///
    /// If `pattern` is not a valid regex.
    pub fn header(&mut self, name: &str, pattern: &str) -> &mut Self {
        or_panic(self.try_header(name, pattern))
    }

    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn try_header(&mut self, name: &str, pattern: &str) -> Result<&mut Self, ConfigError> {
        let matcher = HeaderMatch::new(name, pattern)?;
        Ok(self.filter(Filter::Header(matcher)))
    }

    /// Require query parameter `name` to be present with a value matching
    /// `pattern`, e.g. `route.query("id", r"\d+")`.
    ///
    /// # Panics
    ///
    /// If `pattern` is not a valid regex.
    pub fn query(&mut self, name: &str, pattern: &str) -> &mut Self {
        or_panic(self.try_query(name, pattern))
    }

    /// # Errors
    ///
    /// [`ConfigError::InvalidPattern`] if `pattern` is not a valid regex.
    pub fn try_query(&mut self, name: &str, pattern: &str) -> Result<&mut Self, ConfigError> {
        let matcher = QueryMatch::new(name, pattern)?;
        Ok(self.filter(Filter::Query(matcher)))
    }

    /// Bind the route's action.
    ///
    /// # Panics
    ///
    /// If an action is already bound.
    pub fn set_action(&mut self, action: Action) -> &mut Self {
        or_panic(self.try_set_action(action))
    }

    /// # Errors
    ///
    /// [`ConfigError::ActionAlreadySet`] if an action is already bound.
    pub fn try_set_action(&mut self, action: Action) -> Result<&mut Self, ConfigError> {
        if self.action.is_some() {
            return Err(ConfigError::ActionAlreadySet {
                route: self.path.clone(),
            });
        }
        self.action = Some(action);
        Ok(self)
    }

    /// Bind a `(Context) -> Response` function.
    pub fn action<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context) -> Response + Send + Sync + 'static,
    {
        self.set_action(from_fn(f))
    }

    /// Bind a raw handler.
    pub fn handler<H: Handler + 'static>(&mut self, handler: H) -> &mut Self {
        self.set_action(from_handler(Arc::new(handler)))
    }

    /// Bind a raw handler function.
    pub fn handler_fn<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&IncomingRequest, &mut dyn ResponseSink) + Send + Sync + 'static,
    {
        self.handler(f)
    }

    /// Declare the request body type; functions bound later must take it.
    pub fn api_request_type<T: 'static>(&mut self) -> &mut Self {
        self.request_type = Some(TypeDescriptor::of::<T>());
        self
    }

    /// Declare the response body type. Informational only.
    pub fn api_response_type<T: 'static>(&mut self) -> &mut Self {
        self.response_type = Some(TypeDescriptor::of::<T>());
        self
    }

    /// Bind a function that takes no request body.
    ///
    /// # Panics
    ///
    /// If an action is already bound or a request type was declared.
    pub fn api_function<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context) -> Response + Send + Sync + 'static,
    {
        or_panic(self.try_api_function(f))
    }

    /// # Errors
    ///
    /// [`ConfigError::RequestTypeMismatch`] if a request type was declared,
    /// [`ConfigError::ActionAlreadySet`] if an action is already bound.
    pub fn try_api_function<F>(&mut self, f: F) -> Result<&mut Self, ConfigError>
    where
        F: Fn(&mut Context) -> Response + Send + Sync + 'static,
    {
        if let Some(declared) = self.request_type {
            return Err(ConfigError::RequestTypeMismatch {
                route: self.path.clone(),
                declared: declared.name(),
                found: "no request body",
            });
        }
        self.try_set_action(typed::api_function(f))
    }

    /// Bind a function taking the request body decoded as `T`.
    ///
    /// Records `T` as the request type when none was declared.
    ///
    /// # Panics
    ///
    /// If an action is already bound or a different request type was declared.
    pub fn api_typed_function<T, F>(&mut self, f: F) -> &mut Self
    where
        T: DeserializeOwned + 'static,
        F: Fn(&mut Context, T) -> Response + Send + Sync + 'static,
    {
        or_panic(self.try_api_typed_function(f))
    }

    /// # Errors
    ///
    /// [`ConfigError::RequestTypeMismatch`] if a different request type was
    /// declared, [`ConfigError::ActionAlreadySet`] if an action is already bound.
    pub fn try_api_typed_function<T, F>(&mut self, f: F) -> Result<&mut Self, ConfigError>
    where
        T: DeserializeOwned + 'static,
        F: Fn(&mut Context, T) -> Response + Send + Sync + 'static,
    {
        let found = TypeDescriptor::of::<T>();
        if let Some(declared) = self.request_type {
            if declared != found {
                return Err(ConfigError::RequestTypeMismatch {
                    route: self.path.clone(),
                    declared: declared.name(),
                    found: found.name(),
                });
            }
        }
        self.try_set_action(typed::api_typed_function(f))?;
        self.request_type = Some(found);
        Ok(self)
    }

    #[must_use]
    pub fn route_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The path template, including the service root.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn pattern(&self) -> &PathPattern {
        self.path_match.pattern()
    }

    #[must_use]
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    #[must_use]
    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    #[must_use]
    pub fn request_type(&self) -> Option<TypeDescriptor> {
        self.request_type
    }

    #[must_use]
    pub fn response_type(&self) -> Option<TypeDescriptor> {
        self.response_type
    }

    /// The route's single method.
    ///
    /// # Panics
    ///
    /// Unless exactly one method is registered.
    #[must_use]
    pub fn method(&self) -> Method {
        or_panic(self.try_method())
    }

    /// # Errors
    ///
    /// [`ConfigError::AmbiguousMethod`] unless exactly one method is registered.
    pub fn try_method(&self) -> Result<Method, ConfigError> {
        match self.method_match.as_ref().map(MethodMatch::methods) {
            Some([method]) => Ok(method.clone()),
            other => Err(ConfigError::AmbiguousMethod {
                route: self.path.clone(),
                count: other.map_or(0, <[Method]>::len),
            }),
        }
    }

    /// Substitute `bindings` into the path template.
    ///
    /// See [`PathPattern::reverse`] for the substitution rules.
    pub fn reverse<I, K, V>(&self, bindings: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.path_match.pattern().reverse(bindings)
    }

    /// Run the filter chain in order, stopping at the first rejection.
    pub fn accepts(&self, cx: &mut Context) -> bool {
        self.filters.iter().all(|filter| filter.accept(cx))
    }

    /// Run the action for an accepted request and write its response.
    pub(crate) fn dispatch(&self, mut cx: Context, sink: &mut dyn ResponseSink) {
        match &self.action {
            Some(action) => action(&mut cx).write(sink),
            None => {
                error!(
                    request_id = %cx.request_id(),
                    route = %self,
                    "Matched route has no action"
                );
                write_text_error(sink, StatusCode::INTERNAL_SERVER_ERROR, "route has no action");
            }
        }
    }

    /// Serve `request` with this route alone, answering 404 when a filter rejects.
    pub fn serve(
        &self,
        request: IncomingRequest,
        registry: &Arc<SerializerRegistry>,
        sink: &mut dyn ResponseSink,
    ) {
        let request_id = RequestId::from_headers(request.headers());
        let request = Arc::new(request);
        let mut cx = Context::new(Arc::clone(&request), Arc::clone(registry), request_id);
        if self.accepts(&mut cx) {
            self.dispatch(cx, sink);
        } else {
            debug!(request_id = %request_id, route = %self, "Route rejected request");
            NotFound.serve_http(&request, sink);
        }
    }

    /// [`Route::serve`] over `http` types, using the default registry.
    pub fn handle(&self, request: http::Request<Vec<u8>>) -> http::Response<Vec<u8>> {
        let registry = Arc::new(SerializerRegistry::default());
        let mut sink = BufferedResponse::new();
        self.serve(request.into(), &registry, &mut sink);
        sink.into_http()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Route")?;
        for filter in &self.filters {
            write!(f, ".{filter}")?;
        }
        if let Some(name) = &self.name {
            write!(f, ".Named({name:?})")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("filters", &self.filters)
            .field("has_action", &self.action.is_some())
            .field("request_type", &self.request_type)
            .field("response_type", &self.response_type)
            .finish()
    }
}
