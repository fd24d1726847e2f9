//! The encodings a registry entry can point at.

use crate::error::CodecError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::io::{Read, Write};
use std::sync::Arc;

/// A pluggable encoding that works on `serde_json::Value` trees.
///
/// Used for formats that are not built in; the value is converted to and
/// from the handler's type through `serde_json`.
pub trait ValueCodec: Send + Sync {
    /// Write `value` to `sink`.
    ///
    /// # Errors
    ///
    /// Returns the encoding or I/O failure.
    fn encode_value(&self, value: &Value, sink: &mut dyn Write) -> Result<(), CodecError>;

    /// Read one value from `source`.
    ///
    /// # Errors
    ///
    /// Returns the decoding or I/O failure.
    fn decode_value(&self, source: &mut dyn Read) -> Result<Value, CodecError>;
}

/// One encoder/decoder pair.
#[derive(Clone)]
pub enum Codec {
    /// `serde_json`.
    Json,
    /// MessagePack through `rmp-serde`; structs are written as maps with field names.
    MsgPack,
    /// `postcard`; compact and not self-describing, so both ends must agree on the type.
    Postcard,
    /// Anything else, through a [`ValueCodec`].
    Custom(Arc<dyn ValueCodec>),
}

impl Codec {
    /// Encode `value` into `sink`.
    ///
    /// # Errors
    ///
    /// Returns the codec's serialization error or the sink's I/O error.
    pub fn encode<T, W>(&self, mut sink: W, value: &T) -> Result<(), CodecError>
    where
        T: Serialize + ?Sized,
        W: Write,
    {
        match self {
            Codec::Json => serde_json::to_writer(sink, value)?,
            // named encoding writes structs as maps keyed by field name
            Codec::MsgPack => rmp_serde::encode::write_named(&mut sink, value)?,
            Codec::Postcard => {
                let bytes = postcard::to_stdvec(value)?;
                sink.write_all(&bytes)?;
            }
            Codec::Custom(codec) => {
                let tree = serde_json::to_value(value)?;
                codec.encode_value(&tree, &mut sink)?;
            }
        }
        Ok(())
    }

    /// Decode one `T` from `source`.
    ///
    /// # Errors
    ///
    /// Returns the codec's deserialization error or the source's I/O error.
    pub fn decode<T, R>(&self, mut source: R) -> Result<T, CodecError>
    where
        T: DeserializeOwned,
        R: Read,
    {
        match self {
            Codec::Json => Ok(serde_json::from_reader(source)?),
            Codec::MsgPack => Ok(rmp_serde::from_read(source)?),
            Codec::Postcard => {
                let mut bytes = Vec::new();
                source.read_to_end(&mut bytes)?;
                Ok(postcard::from_bytes(&bytes)?)
            }
            Codec::Custom(codec) => {
                let tree = codec.decode_value(&mut source)?;
                Ok(serde_json::from_value(tree)?)
            }
        }
    }

    /// Encode into a fresh buffer.
    ///
    /// # Errors
    ///
    /// Same as [`Codec::encode`].
    pub fn to_vec<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut buf = Vec::new();
        self.encode(&mut buf, value)?;
        Ok(buf)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Json => write!(f, "Json"),
            Codec::MsgPack => write!(f, "MsgPack"),
            Codec::Postcard => write!(f, "Postcard"),
            Codec::Custom(_) => write!(f, "Custom"),
        }
    }
}
