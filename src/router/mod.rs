//! # Router Module
//!
//! The router module declares routes against a [`Service`] and decides which
//! one serves a request.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates (`/items/{id}`, `/files/{path...}`) into anchored regexes
//! - Holding each route's ordered filter chain (path, methods, headers, query, custom)
//! - Evaluating routes in registration order and dispatching the first match
//! - Reverse routing: rebuilding a path from a named route and its bindings
//!
//! ## Architecture
//!
//! The router works in two phases:
//!
//! 1. **Setup**: `service.path(template)` compiles the template into a
//!    [`PathMatch`] filter and appends a [`Route`]. Chained calls add method,
//!    header, query or custom filters and bind exactly one action.
//!
//! 2. **Serving**: for each request the service builds a fresh
//!    [`Context`](crate::server::Context) per route, runs that route's filters
//!    until one rejects, and on full acceptance runs the action and writes its
//!    response. If no route accepts, the default handler answers (a plain 404
//!    unless replaced).
//!
//! ## Example
//!
//! ```rust
//! use pathways::router::Service;
//! use http::{Request, StatusCode};
//!
//! let mut service = Service::new("/api");
//! service
//!     .path("/items/{id}")
//!     .name("GetItem")
//!     .get()
//!     .action(|cx| {
//!         let id = cx.path_var("id").unwrap_or_default().to_string();
//!         cx.api_response(StatusCode::OK, id)
//!     });
//!
//! let response = service.handle(Request::get("/api/items/42").body(Vec::new()).unwrap());
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body(), br#""42""#);
//!
//! let route = service.find("GetItem").unwrap();
//! assert_eq!(route.reverse([("id", "7")]), "/api/items/7");
//! ```
//!
//! ## Performance
//!
//! Matching is linear in the number of routes; route order is priority and is
//! never changed. Path variables are kept in a [`ParamVec`] that stays on the
//! stack for up to [`MAX_INLINE_PARAMS`] captures.

mod filters;
mod pattern;
mod route;
mod service;
#[cfg(test)]
mod tests;

pub use filters::{Filter, HeaderMatch, MethodMatch, PathMatch, QueryMatch, StageAcceptor};
pub use pattern::{ParamVec, PathPattern, PathVars, MAX_INLINE_PARAMS};
pub use route::Route;
pub use service::Service;
