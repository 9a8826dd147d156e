//! Request DTOs for the cache API
//!
//! Defines the structure of incoming HTTP request bodies.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::cache::MAX_KEY_LENGTH;

/// How a value is carried in a JSON body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueEncoding {
    /// Plain text, stored as its UTF-8 bytes
    #[default]
    Utf8,
    /// Arbitrary bytes, standard base64 with padding
    Base64,
}

impl ValueEncoding {
    /// Decodes a body value into the bytes to store.
    pub fn decode(self, value: &str) -> Result<Vec<u8>, String> {
        match self {
            ValueEncoding::Utf8 => Ok(value.as_bytes().to_vec()),
            ValueEncoding::Base64 => STANDARD
                .decode(value)
                .map_err(|err| format!("Value is not valid base64: {}", err)),
        }
    }

    /// Encodes stored bytes for a response, picking text when the bytes
    /// are valid UTF-8.
    pub fn encode(bytes: &[u8]) -> (Self, String) {
        match std::str::from_utf8(bytes) {
            Ok(text) => (ValueEncoding::Utf8, text.to_string()),
            Err(_) => (ValueEncoding::Base64, STANDARD.encode(bytes)),
        }
    }
}

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: The value, as text or base64 depending on `encoding`
/// - `ttl`: Optional TTL in seconds (uses the configured default if absent)
/// - `encoding`: `"utf8"` (default) or `"base64"`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    pub key: String,
    pub value: String,
    #[serde(default)]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub encoding: ValueEncoding,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        if self.key.len() > MAX_KEY_LENGTH {
            return Some(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            ));
        }
        None
    }

    /// Bytes to store, decoded according to `encoding`.
    pub fn value_bytes(&self) -> Result<Vec<u8>, String> {
        self.encoding.decode(&self.value)
    }
}
