//! # Dispatcher Module
//!
//! Adapters that turn the different kinds of route handlers into the single
//! [`Action`] signature a route invokes.
//!
//! - [`from_handler`] - a raw [`Handler`] writing directly to the response sink
//! - [`from_fn`] - a `(Context) -> Response` function
//! - [`typed`](crate::typed) - functions taking a decoded request body
//!
//! Whatever the adapter, the result is a deferred [`Response`](crate::server::Response):
//! nothing reaches the sink until the service writes it.
//!
//! ```rust
//! use pathways::dispatcher::{from_fn, from_handler, Handler};
//! use pathways::server::{IncomingRequest, ResponseSink};
//! use http::StatusCode;
//! use std::sync::Arc;
//!
//! let raw = from_handler(Arc::new(|_req: &IncomingRequest, sink: &mut dyn ResponseSink| {
//!     sink.set_status(StatusCode::NO_CONTENT);
//! }));
//! let api = from_fn(|cx| cx.api_response(StatusCode::OK, "pong"));
//! # let _ = (raw, api);
//! ```

mod core;

pub use self::core::{api_not_found, from_fn, from_handler, Action, Handler, NotFound};
