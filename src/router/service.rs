use super::route::{or_panic, Route};
use crate::codec::SerializerRegistry;
use crate::dispatcher::{from_fn, Action, Handler, NotFound};
use crate::error::ConfigError;
use crate::ids::RequestId;
use crate::runtime_config::ServiceConfig;
use crate::server::{BufferedResponse, Context, IncomingRequest, Response, ResponseSink};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, info_span, warn};

/// Matching slower than this is logged as a warning.
const SLOW_MATCH_THRESHOLD: Duration = Duration::from_millis(1);

/// What runs when no route accepts a request.
#[derive(Clone)]
enum Fallback {
    Handler(Arc<dyn Handler>),
    Action(Action),
}

/// An ordered set of routes under a common root.
///
/// Routes are tried in registration order and the first one whose filters
/// all accept serves the request. The service is built once at startup and
/// only read while serving.
pub struct Service {
    root: String,
    routes: Vec<Route>,
    fallback: Fallback,
    registry: Arc<SerializerRegistry>,
}

impl Service {
    /// Create a service rooted at `root` with the default codecs.
    ///
    /// Trailing slashes are normalized so the root ends with exactly one `/`.
    #[must_use]
    pub fn new(root: &str) -> Self {
        Self::with_registry(root, Arc::new(SerializerRegistry::default()))
    }

    #[must_use]
    pub fn with_registry(root: &str, registry: Arc<SerializerRegistry>) -> Self {
        Self {
            root: format!("{}/", root.trim_end_matches('/')),
            routes: Vec::new(),
            fallback: Fallback::Handler(Arc::new(NotFound)),
            registry,
        }
    }

    /// Build an empty service from runtime configuration.
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnknownCodec`], or [`ConfigError::UnregisteredDefault`] when the
    /// default content type is not among the configured codecs.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let registry = config.registry()?;
        Ok(Self::with_registry(&config.root, Arc::new(registry)))
    }

    /// Register a route for `path`, relative to the root.
    ///
    /// # Panics
    ///
    /// If the template does not compile; see [`Service::try_path`].
    pub fn path(&mut self, path: &str) -> &mut Route {
        or_panic(self.try_path(path))
    }

    /// # Errors
    ///
    /// See [`PathPattern::compile`](super::PathPattern::compile).
    pub fn try_path(&mut self, path: &str) -> Result<&mut Route, ConfigError> {
        let template = format!("{}{}", self.root, path.trim_start_matches('/'));
        let route = Route::try_new(&template)?;
        debug!(
            template = %template,
            pattern = %route.pattern().as_str(),
            position = self.routes.len(),
            "Route registered"
        );
        let index = self.routes.len();
        self.routes.push(route);
        Ok(&mut self.routes[index])
    }

    /// Raw handler to run when no route matches. Defaults to a plain-text 404.
    pub fn default_handler<H: Handler + 'static>(&mut self, handler: H) -> &mut Self {
        self.fallback = Fallback::Handler(Arc::new(handler));
        self
    }

    /// Action to run when no route matches, e.g. [`api_not_found`](crate::dispatcher::api_not_found).
    pub fn default_action<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut Context) -> Response + Send + Sync + 'static,
    {
        self.fallback = Fallback::Action(from_fn(f));
        self
    }

    /// First route registered under `name`.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.route_name() == Some(name))
    }

    /// Mutable lookup, for binding actions after registration.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Route> {
        self.routes.iter_mut().find(|r| r.route_name() == Some(name))
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    #[must_use]
    pub fn registry(&self) -> &Arc<SerializerRegistry> {
        &self.registry
    }

    /// Dispatch `request` to the first accepting route, or the fallback.
    pub fn serve(&self, request: IncomingRequest, sink: &mut dyn ResponseSink) {
        let request_id = RequestId::from_headers(request.headers());
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            path = %request.path()
        );
        let _enter = span.enter();

        let request = Arc::new(request);
        let match_start = Instant::now();
        for route in &self.routes {
            let mut cx = Context::new(
                Arc::clone(&request),
                Arc::clone(&self.registry),
                request_id,
            );
            if !route.accepts(&mut cx) {
                continue;
            }

            let match_duration = match_start.elapsed();
            if match_duration > SLOW_MATCH_THRESHOLD {
                warn!(
                    route = %route,
                    path_vars = ?cx.path_vars(),
                    duration_us = match_duration.as_micros(),
                    "Slow route matching detected"
                );
            } else {
                info!(
                    route = %route,
                    path_vars = ?cx.path_vars(),
                    duration_us = match_duration.as_micros(),
                    "Route matched"
                );
            }
            route.dispatch(cx, sink);
            return;
        }

        debug!(
            routes = self.routes.len(),
            duration_us = match_start.elapsed().as_micros(),
            "No route matched"
        );
        match &self.fallback {
            Fallback::Handler(handler) => handler.serve_http(&request, sink),
            Fallback::Action(action) => {
                let mut cx = Context::new(request, Arc::clone(&self.registry), request_id);
                action(&mut cx).write(sink);
            }
        }
    }

    /// [`Service::serve`] over `http` types, buffering the response.
    pub fn handle(&self, request: http::Request<Vec<u8>>) -> http::Response<Vec<u8>> {
        let mut sink = BufferedResponse::new();
        self.serve(request.into(), &mut sink);
        sink.into_http()
    }
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let routes: Vec<String> = self.routes.iter().map(ToString::to_string).collect();
        f.debug_struct("Service")
            .field("root", &self.root)
            .field("routes", &routes)
            .field(
                "default_content_type",
                &self.registry.default_content_type(),
            )
            .finish_non_exhaustive()
    }
}
