//! # Server Module
//!
//! The request-scoped types the routing engine works with. The engine never
//! touches sockets: the host server hands it an [`IncomingRequest`] and a
//! [`ResponseSink`], and everything in between happens on a per-attempt
//! [`Context`] that produces a deferred [`Response`].

pub mod context;
pub mod request;
pub mod response;

pub use context::Context;
pub use request::{IncomingRequest, QueryParams};
pub use response::{write_text_error, BufferedResponse, Response, ResponseSink};
