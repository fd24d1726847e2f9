//! # Typed Module
//!
//! Type-safe handler adapters. Instead of inspecting a function's signature
//! at runtime, the request body type is a generic parameter: the route
//! decodes the body into `T` and calls `f(cx, T)`, and the compiler checks
//! that the two agree.
//!
//! ```rust
//! use pathways::router::Service;
//! use pathways::server::{Context, Response};
//! use http::StatusCode;
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct NewPet {
//!     name: String,
//! }
//!
//! fn create(cx: &mut Context, pet: NewPet) -> Response {
//!     cx.api_response(StatusCode::CREATED, pet.name)
//! }
//!
//! let mut service = Service::new("/api");
//! service.path("/pets").name("Create").post().api_typed_function(create);
//! ```
//!
//! Routes may declare their body types ahead of binding a function
//! ([`Route::api_request_type`](crate::router::Route::api_request_type)); a
//! function over a different type is then rejected as a configuration error.
//!
//! [`coerce`] converts strings to scalar kinds for simple arguments.

mod coerce;
mod core;

pub use self::coerce::{coerce, Scalar, ScalarKind};
pub use self::core::{api_function, api_typed_function, TypeDescriptor};
