//! # pathways
//!
//! **pathways** declares named HTTP routes on a service, matches incoming
//! requests through an ordered chain of filters, and dispatches them to raw
//! handlers, plain functions, or typed functions bound to a decoded request
//! body, negotiating the body encoding from the request headers.
//!
//! ## Overview
//!
//! The engine does not own a socket. A host server hands it an
//! [`IncomingRequest`](server::IncomingRequest) and something implementing
//! [`ResponseSink`](server::ResponseSink); the engine picks a route, runs its
//! action, and writes exactly one response.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`router`]** - Path templates, filters, routes and the service dispatch loop
//! - **[`server`]** - Request, response sink, per-attempt context and deferred responses
//! - **[`codec`]** - Content-type keyed serializer registry (JSON, MessagePack, postcard, custom)
//! - **[`dispatcher`]** - Adapters from handlers and functions to route actions
//! - **[`typed`]** - Typed body adapters and scalar coercion
//! - **[`client`]** - Reverse-routing HTTP client
//! - **[`runtime_config`]** - Environment and YAML configuration
//! - **[`logging`]** - `tracing` subscriber setup
//!
//! ### Request Handling Flow
//!
//! ```text
//! IncomingRequest
//!   -> Service::serve         request id, span
//!   -> for each Route, in registration order
//!        fresh Context
//!        filters in order     Path, Methods, Header, Query, Custom; first "no" skips the route
//!   -> Action(Context)        -> Response (nothing written yet)
//!   -> Response::write(sink)  headers, then body
//!   (no route accepted)       -> default handler, a plain 404 unless replaced
//! ```
//!
//! ### Key Architectural Patterns
//!
//! 1. **First match wins**: routes are never reordered; register specific paths first
//! 2. **Deferred responses**: actions return a [`Response`](server::Response) that is written once, after the action returns
//! 3. **Negotiated encoding**: `Accept`, then the registry default, then `Content-Type`
//! 4. **Setup errors are loud**: builder methods panic on misconfiguration, `try_*` variants return [`ConfigError`]
//!
//! ## Quick Start
//!
//! ```rust
//! use pathways::router::Service;
//! use pathways::server::Context;
//! use http::{Request, StatusCode};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Pet {
//!     name: String,
//! }
//!
//! let mut service = Service::new("/api");
//! service
//!     .path("/pets/{id}")
//!     .name("GetPet")
//!     .get()
//!     .action(|cx| {
//!         let name = format!("pet-{}", cx.path_var("id").unwrap_or_default());
//!         cx.api_response(StatusCode::OK, Pet { name })
//!     });
//! service
//!     .path("/pets")
//!     .name("CreatePet")
//!     .post()
//!     .api_typed_function(|cx: &mut Context, pet: Pet| cx.api_response(StatusCode::CREATED, pet));
//!
//! let response = service.handle(Request::get("/api/pets/7").body(Vec::new()).unwrap());
//! assert_eq!(response.status(), StatusCode::OK);
//! assert_eq!(response.body(), br#"{"name":"pet-7"}"#);
//! ```
//!
//! ## Logging
//!
//! Every served request runs inside a `request` span carrying its
//! [`RequestId`](ids::RequestId). Install a subscriber with
//! [`logging::init_logging_with_config`] or bring your own.

pub mod client;
pub mod codec;
pub mod dispatcher;
pub mod error;
pub mod ids;
pub mod logging;
pub mod router;
pub mod runtime_config;
pub mod server;
pub mod typed;

pub use error::{ClientError, CodecError, CoerceError, ConfigError};
pub use router::{Route, Service};
pub use server::{Context, Response};
