//! JSON decoding of payloads and consumer error bodies.
//!
//! # Design
//! `JsonDecoder` carries no per-call state, so one instance is shared by
//! every call a `NetworkManager` makes. Failures are flattened into
//! [`DecodeFailure`], which is cheap to clone and compare, unlike
//! `serde_json::Error`.

use std::fmt;

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Deserializer, Serialize};

/// Structured description of a failed decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeFailure {
    pub category: DecodeCategory,
    pub message: String,
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeCategory {
    Io,
    /// The input is not syntactically valid JSON.
    Syntax,
    /// Valid JSON that does not match the target type.
    Data,
    /// The input ended before a complete value was read.
    Eof,
}

impl From<serde_json::Error> for DecodeFailure {
    fn from(err: serde_json::Error) -> Self {
        let category = match err.classify() {
            serde_json::error::Category::Io => DecodeCategory::Io,
            serde_json::error::Category::Syntax => DecodeCategory::Syntax,
            serde_json::error::Category::Data => DecodeCategory::Data,
            serde_json::error::Category::Eof => DecodeCategory::Eof,
        };
        DecodeFailure {
            category,
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        }
    }
}

impl fmt::Display for DecodeFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} error: {}", self.category, self.message)
    }
}

/// Shared, stateless JSON decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDecoder;

impl JsonDecoder {
    pub fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, DecodeFailure> {
        serde_json::from_slice(bytes).map_err(DecodeFailure::from)
    }

    /// The canonical empty value of `T`, if it has one.
    ///
    /// A type has an empty form when its serde representation accepts JSON
    /// `null`: `()`, `Option<_>` and [`EmptyResponse`] all do.
    pub fn empty<T: DeserializeOwned>(&self) -> Option<T> {
        serde_json::from_value(serde_json::Value::Null).ok()
    }
}

/// Payload type for calls whose response body carries nothing of interest.
///
/// Decodes from an empty body, from `null`, and from any JSON value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmptyResponse;

impl<'de> Deserialize<'de> for EmptyResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        IgnoredAny::deserialize(deserializer)?;
        Ok(EmptyResponse)
    }
}
