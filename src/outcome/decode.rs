//! Success value decoding
//!
//! Contract return values arrive base64-encoded. They are decoded to UTF-8
//! text and, when the text is JSON, parsed into a structured value.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// A decoded contract return value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    /// The text parsed as JSON
    Json(serde_json::Value),
    /// The text was not JSON and is returned unchanged
    Text(String),
}

impl DecodedValue {
    /// Returns the plain string this value carries, if any.
    ///
    /// A JSON string literal (e.g. `"hello"` returned by a view method) counts
    /// as plain text as well.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            DecodedValue::Text(text) => Some(text),
            DecodedValue::Json(serde_json::Value::String(text)) => Some(text),
            DecodedValue::Json(_) => None,
        }
    }

    /// Returns the parsed JSON value, if the text was JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            DecodedValue::Json(value) => Some(value),
            DecodedValue::Text(_) => None,
        }
    }
}

/// Decodes a base64 success value.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, and JSON parse
/// failures fall back to the raw text. The only failure is invalid base64.
pub fn decode(success_value: &str) -> Result<DecodedValue, ResolveError> {
    let bytes = STANDARD
        .decode(success_value)
        .map_err(|e| ResolveError::Encoding(format!("Invalid base64 success value: {}", e)))?;
    Ok(decode_bytes(&bytes))
}

/// Interprets raw bytes as UTF-8 text and attempts a JSON parse.
pub fn decode_bytes(bytes: &[u8]) -> DecodedValue {
    let text = String::from_utf8_lossy(bytes);
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => DecodedValue::Json(value),
        Err(_) => DecodedValue::Text(text.into_owned()),
    }
}
