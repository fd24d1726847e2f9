use super::wire::Codec;
use crate::error::{CodecError, ConfigError};
use crate::server::{IncomingRequest, ResponseSink};
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{Read, Write};
use tracing::{debug, warn};

pub const JSON: &str = "application/json";
pub const MSGPACK: &str = "application/x-msgpack";
pub const POSTCARD: &str = "application/x-postcard";

/// Content type every negotiation failure falls back to.
pub const FALLBACK_CONTENT_TYPE: &str = JSON;

/// Structured error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub status: u16,
    pub error: String,
}

#[derive(Debug, Clone)]
struct Entry {
    codec: Codec,
    header: HeaderValue,
}

/// Codecs by content type.
///
/// Lookups are exact string matches: `application/json; charset=utf-8` does
/// not find the `application/json` entry. The registry is immutable once
/// built and is shared by reference between the service and its clients.
#[derive(Debug, Clone)]
pub struct SerializerRegistry {
    codecs: HashMap<String, Entry>,
    default_content_type: String,
}

/// Builder for [`SerializerRegistry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    codecs: Vec<(String, Codec)>,
    default_content_type: Option<String>,
}

impl RegistryBuilder {
    /// Register `codec` under `content_type`, replacing an earlier entry.
    pub fn codec(mut self, content_type: impl Into<String>, codec: Codec) -> Self {
        self.codecs.push((content_type.into(), codec));
        self
    }

    /// Content type assumed when a request states no preference.
    pub fn default_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.default_content_type = Some(content_type.into());
        self
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidContentType`] for a content type that is not a valid header value.
    pub fn build(self) -> Result<SerializerRegistry, ConfigError> {
        let mut codecs = HashMap::with_capacity(self.codecs.len());
        for (content_type, codec) in self.codecs {
            let header =
                HeaderValue::from_str(&content_type).map_err(|e| ConfigError::InvalidContentType {
                    content_type: content_type.clone(),
                    reason: e.to_string(),
                })?;
            debug!(content_type = %content_type, codec = ?codec, "Codec registered");
            codecs.insert(content_type, Entry { codec, header });
        }
        Ok(SerializerRegistry {
            codecs,
            default_content_type: self
                .default_content_type
                .unwrap_or_else(|| JSON.to_string()),
        })
    }
}

impl Default for SerializerRegistry {
    /// JSON, MessagePack and postcard under their usual content types.
    fn default() -> Self {
        let mut codecs = HashMap::new();
        for (content_type, codec) in [
            (JSON, Codec::Json),
            (MSGPACK, Codec::MsgPack),
            (POSTCARD, Codec::Postcard),
        ] {
            codecs.insert(
                content_type.to_string(),
                Entry {
                    codec,
                    header: HeaderValue::from_static(content_type),
                },
            );
        }
        Self {
            codecs,
            default_content_type: JSON.to_string(),
        }
    }
}

impl SerializerRegistry {
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    #[must_use]
    pub fn get(&self, content_type: &str) -> Option<&Codec> {
        self.codecs.get(content_type).map(|e| &e.codec)
    }

    #[must_use]
    pub fn contains(&self, content_type: &str) -> bool {
        self.codecs.contains_key(content_type)
    }

    /// Registered content types, in no particular order.
    pub fn content_types(&self) -> impl Iterator<Item = &str> {
        self.codecs.keys().map(String::as_str)
    }

    #[must_use]
    pub fn default_content_type(&self) -> &str {
        &self.default_content_type
    }

    /// # Errors
    ///
    /// [`CodecError::UnsupportedContentType`] when nothing is registered for
    /// `content_type`, otherwise the codec's own failure.
    pub fn encode<T, W>(&self, content_type: &str, sink: W, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        self.get(content_type)
            .ok_or(CodecError::UnsupportedContentType)?
            .encode(sink, value)
    }

    /// # Errors
    ///
    /// Same as [`SerializerRegistry::encode`].
    pub fn decode<T, R>(&self, content_type: &str, source: R) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        self.get(content_type)
            .ok_or(CodecError::UnsupportedContentType)?
            .decode(source)
    }

    /// Decode the buffered body of `request`.
    ///
    /// # Errors
    ///
    /// Same as [`SerializerRegistry::decode`].
    pub fn decode_request<T>(
        &self,
        request: &IncomingRequest,
        content_type: &str,
    ) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
    {
        self.decode(content_type, request.body())
    }

    /// Write `value` as a complete response in `content_type`.
    ///
    /// When `content_type` has no codec the response is still written: JSON,
    /// status 400, and an [`ApiError`] naming the rejected type (its `status`
    /// field carries the status the caller asked for). The call then returns
    /// [`CodecError::InvalidContentType`] so the caller can observe it.
    ///
    /// # Errors
    ///
    /// [`CodecError::InvalidContentType`] on fallback, or the codec's failure.
    pub fn encode_response<T>(
        &self,
        sink: &mut dyn ResponseSink,
        status: StatusCode,
        content_type: &str,
        value: &T,
    ) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
    {
        if let Some(entry) = self.codecs.get(content_type) {
            sink.headers_mut().insert(CONTENT_TYPE, entry.header.clone());
            sink.set_status(status);
            return entry.codec.encode(sink, value);
        }

        let error = CodecError::InvalidContentType(content_type.to_string());
        warn!(
            content_type = %content_type,
            requested_status = status.as_u16(),
            "No codec for requested content type, answering with JSON 400"
        );
        sink.headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(FALLBACK_CONTENT_TYPE));
        sink.set_status(StatusCode::BAD_REQUEST);
        let body = ApiError {
            status: status.as_u16(),
            error: error.to_string(),
        };
        if let Err(e) = Codec::Json.encode(sink, &body) {
            warn!(error = %e, "Failed to write fallback error body");
        }
        Err(error)
    }
}
