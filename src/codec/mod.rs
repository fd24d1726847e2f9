//! # Codec Module
//!
//! Content-negotiated serialization between wire bytes and typed values.
//!
//! A [`SerializerRegistry`] maps content-type strings to [`Codec`]s. The
//! default registry carries:
//!
//! - `application/json` - [`Codec::Json`] (`serde_json`)
//! - `application/x-msgpack` - [`Codec::MsgPack`] (`rmp-serde`, struct-as-map)
//! - `application/x-postcard` - [`Codec::Postcard`] (`postcard`)
//!
//! Any of them may be left out of a custom registry, and other formats plug in
//! through [`ValueCodec`].
//!
//! ## Negotiation failures
//!
//! [`SerializerRegistry::encode_response`] always produces a response. When
//! the requested content type is unknown it answers `400` with a JSON
//! [`ApiError`] *and* returns [`CodecError::InvalidContentType`](crate::error::CodecError::InvalidContentType).
//!
//! ```rust
//! use pathways::codec::{SerializerRegistry, JSON};
//!
//! let registry = SerializerRegistry::default();
//! let mut body = Vec::new();
//! registry.encode(JSON, &mut body, &vec!["a", "b"]).unwrap();
//! let back: Vec<String> = registry.decode(JSON, &body[..]).unwrap();
//! assert_eq!(back, vec!["a", "b"]);
//! ```

mod core;
mod wire;

pub use self::core::{
    ApiError, RegistryBuilder, SerializerRegistry, FALLBACK_CONTENT_TYPE, JSON, MSGPACK, POSTCARD,
};
pub use wire::{Codec, ValueCodec};
