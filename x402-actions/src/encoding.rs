//! Base64 JSON helpers for x402 headers.
//!
//! Every x402 header (`PAYMENT-REQUIRED`, `PAYMENT-SIGNATURE`, `X-PAYMENT`,
//! `PAYMENT-RESPONSE`) carries standard-alphabet base64 over a JSON document.

use std::fmt::{self, Display, Formatter};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as b64;
use serde::Serialize;
use serde::de::DeserializeOwned;

/// Errors from decoding a base64 JSON header.
#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    /// The header was not valid base64.
    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),
    /// The decoded bytes were not the expected JSON document.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Base64 text as carried in a header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Base64Bytes(pub Vec<u8>);

impl Base64Bytes {
    /// Decodes the base64 text to raw bytes. Surrounding whitespace is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the data is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        b64.decode(self.0.trim_ascii())
    }

    /// Encodes raw bytes into base64 text.
    pub fn encode<T: AsRef<[u8]>>(input: T) -> Self {
        Self(b64.encode(input.as_ref()).into_bytes())
    }

    /// Serializes `value` as JSON and base64-encodes it.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError::Json`] if serialization fails.
    pub fn encode_json<T: Serialize>(value: &T) -> Result<Self, EncodingError> {
        Ok(Self::encode(serde_json::to_vec(value)?))
    }

    /// Decodes the base64 text and parses the JSON inside.
    ///
    /// # Errors
    ///
    /// Returns [`EncodingError`] on base64 or JSON failure.
    pub fn decode_json<T: DeserializeOwned>(&self) -> Result<T, EncodingError> {
        Ok(serde_json::from_slice(&self.decode()?)?)
    }
}

impl AsRef<[u8]> for Base64Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&[u8]> for Base64Bytes {
    fn from(slice: &[u8]) -> Self {
        Self(slice.to_vec())
    }
}

impl From<&str> for Base64Bytes {
    fn from(value: &str) -> Self {
        Self(value.as_bytes().to_vec())
    }
}

impl Display for Base64Bytes {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use super::*;

    #[test]
    fn test_decode_json_ignores_whitespace() {
        let encoded = Base64Bytes::encode(br#"{"success":true}"#).to_string();
        let padded = format!("  {encoded}\n");
        let value: Value = Base64Bytes::from(padded.as_str()).decode_json().unwrap();
        assert_eq!(value, json!({"success": true}));
    }

    #[test]
    fn test_decode_json_rejects_garbage() {
        let result = Base64Bytes::from("not base64!").decode_json::<Value>();
        assert!(matches!(result, Err(EncodingError::Base64(_))));
        let not_json = Base64Bytes::encode(b"plain text").to_string();
        let result = Base64Bytes::from(not_json.as_str()).decode_json::<Value>();
        assert!(matches!(result, Err(EncodingError::Json(_))));
    }
}
