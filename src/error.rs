//! Error types for pathways.
//!
//! Configuration errors describe programming mistakes made while building a
//! [`Service`](crate::router::Service); the builder methods panic with them and
//! the `try_*` variants hand them back. Everything else is a value that the
//! serving path recovers from.

use http::StatusCode;
use thiserror::Error;

/// A mistake in route or registry setup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A second action was bound to a route.
    #[error("an action has already been applied to route {route}")]
    ActionAlreadySet {
        /// Path template of the route.
        route: String,
    },

    /// The same capture name appears twice in one path template.
    #[error("duplicate capture name {{{name}}} in path template {template:?}")]
    DuplicateCapture {
        /// The repeated capture name.
        name: String,
        /// The offending template.
        template: String,
    },

    /// A path, header or query pattern did not compile.
    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern {
        /// Pattern source.
        pattern: String,
        /// Compiler message.
        reason: String,
    },

    /// `method()` needs exactly one registered method.
    #[error("route {route} has {count} methods registered, expected exactly one")]
    AmbiguousMethod {
        /// Path template of the route.
        route: String,
        /// Number of registered methods.
        count: usize,
    },

    /// The function bound to a route disagrees with its declared request type.
    #[error("route {route} declares request type {declared}, but the bound function takes {found}")]
    RequestTypeMismatch {
        /// Path template of the route.
        route: String,
        /// Declared request type name.
        declared: &'static str,
        /// What the bound function takes.
        found: &'static str,
    },

    /// A content type that cannot be sent as a header value.
    #[error("invalid content type {content_type:?}: {reason}")]
    InvalidContentType {
        /// The rejected content type.
        content_type: String,
        /// Why it is not a valid header value.
        reason: String,
    },

    /// The configured default content type has no registered codec.
    #[error("default content type {0:?} has no registered codec")]
    UnregisteredDefault(String),

    /// A codec name in the configuration is not one of the built-ins.
    #[error("unknown codec {0:?} (expected json, msgpack or postcard)")]
    UnknownCodec(String),
}

/// Failures of the serialization pipeline.
#[derive(Debug, Error)]
pub enum CodecError {
    /// No codec is registered for the content type.
    #[error("unsupported content type")]
    UnsupportedContentType,

    /// A response was requested in an unregistered content type; a JSON
    /// fallback error body was written instead.
    #[error("Invalid content type {0}")]
    InvalidContentType(String),

    /// I/O error while reading a body or writing to a sink.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// MsgPack serialization error.
    #[error("MsgPack encode error: {0}")]
    MsgPackEncode(#[from] rmp_serde::encode::Error),

    /// MsgPack deserialization error.
    #[error("MsgPack decode error: {0}")]
    MsgPackDecode(#[from] rmp_serde::decode::Error),

    /// Postcard serialization/deserialization error.
    #[error("postcard error: {0}")]
    Postcard(#[from] postcard::Error),

    /// Error reported by a custom [`ValueCodec`](crate::codec::ValueCodec).
    #[error("{0}")]
    Custom(String),
}

/// Failures converting a string into a scalar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoerceError {
    /// The string is not a valid value of the requested kind.
    #[error("cannot convert {value:?} to {kind}: {reason}")]
    Invalid {
        /// Input string.
        value: String,
        /// Requested kind.
        kind: &'static str,
        /// Parser message.
        reason: String,
    },

    /// The kind has no string conversion.
    #[error("unsupported argument type {0}")]
    Unsupported(&'static str),
}

/// Failures of the reverse-routing client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// No route carries the requested name.
    #[error("no such route {0:?}")]
    NoSuchRoute(String),

    /// The named route cannot be turned into a request.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Encoding the request or decoding the response failed.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Building or sending the request failed.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The callee answered with a non-2xx status.
    #[error("{message}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// `HTTP error (<code>): <status line>`.
        message: String,
    },

    /// The callee answered in another encoding than the client speaks.
    #[error("expected {expected} response from {url}, got {found}")]
    UnexpectedContentType {
        /// Encoding of the client.
        expected: String,
        /// Request URL.
        url: String,
        /// `Content-Type` of the response.
        found: String,
    },
}

impl ClientError {
    /// Status code of a non-2xx response, if that is what this error is.
    #[must_use]
    pub fn status_code(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
