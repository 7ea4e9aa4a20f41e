//! JSON envelope codec.
//!
//! Purely structural: converts values to and from UTF-8 wire text with no
//! knowledge of the operations layered on top.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WireError {
    #[error("failed to encode message: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to decode message: {0}")]
    Decode(#[source] serde_json::Error),
}

/// Encode a value as one line of wire text.
pub fn encode<T: Serialize>(value: &T) -> Result<String, WireError> {
    serde_json::to_string(value).map_err(WireError::Encode)
}

/// Decode one line of wire text. Malformed text is fatal for the
/// in-flight call and surfaces as [`WireError::Decode`].
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T, WireError> {
    serde_json::from_str(text).map_err(WireError::Decode)
}
