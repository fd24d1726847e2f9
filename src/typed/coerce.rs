//! String to scalar conversion for simple (non-body) arguments such as
//! header, query or path values.

use crate::error::CoerceError;
use std::fmt::Display;
use std::str::FromStr;

/// Target kind of a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Int8,
    Uint8,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Int64,
    Uint64,
    Float32,
    Float64,
    String,
    /// No string conversion.
    Bool,
    /// Platform-sized unsigned integer; no string conversion.
    Uint,
}

impl ScalarKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Int => "int",
            ScalarKind::Int8 => "int8",
            ScalarKind::Uint8 => "uint8",
            ScalarKind::Int16 => "int16",
            ScalarKind::Uint16 => "uint16",
            ScalarKind::Int32 => "int32",
            ScalarKind::Uint32 => "uint32",
            ScalarKind::Int64 => "int64",
            ScalarKind::Uint64 => "uint64",
            ScalarKind::Float32 => "float32",
            ScalarKind::Float64 => "float64",
            ScalarKind::String => "string",
            ScalarKind::Bool => "bool",
            ScalarKind::Uint => "uint",
        }
    }
}

/// A converted value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Int32(i32),
    Uint32(u32),
    Int64(i64),
    Uint64(u64),
    Float32(f32),
    Float64(f64),
    String(String),
}

fn parse<T>(value: &str, kind: ScalarKind) -> Result<T, CoerceError>
where
    T: FromStr,
    T::Err: Display,
{
    value.parse::<T>().map_err(|e| CoerceError::Invalid {
        value: value.to_string(),
        kind: kind.name(),
        reason: e.to_string(),
    })
}

/// Convert `value` to `kind`.
///
/// # Errors
///
/// [`CoerceError::Invalid`] when `value` does not parse,
/// [`CoerceError::Unsupported`] for kinds without a conversion.
pub fn coerce(value: &str, kind: ScalarKind) -> Result<Scalar, CoerceError> {
    Ok(match kind {
        ScalarKind::Int => Scalar::Int(parse(value, kind)?),
        ScalarKind::Int8 => Scalar::Int8(parse(value, kind)?),
        ScalarKind::Uint8 => Scalar::Uint8(parse(value, kind)?),
        ScalarKind::Int16 => Scalar::Int16(parse(value, kind)?),
        ScalarKind::Uint16 => Scalar::Uint16(parse(value, kind)?),
        ScalarKind::Int32 => Scalar::Int32(parse(value, kind)?),
        ScalarKind::Uint32 => Scalar::Uint32(parse(value, kind)?),
        ScalarKind::Int64 => Scalar::Int64(parse(value, kind)?),
        ScalarKind::Uint64 => Scalar::Uint64(parse(value, kind)?),
        ScalarKind::Float32 => Scalar::Float32(parse(value, kind)?),
        ScalarKind::Float64 => Scalar::Float64(parse(value, kind)?),
        ScalarKind::String => Scalar::String(value.to_string()),
        ScalarKind::Bool | ScalarKind::Uint => return Err(CoerceError::Unsupported(kind.name())),
    })
}
