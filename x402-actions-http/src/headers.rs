//! Reading x402 messages from HTTP responses.
//!
//! A 402 challenge travels either in the base64 `PAYMENT-REQUIRED` header
//! (V2) or as the JSON body (V1). Settlement proofs come back in
//! `PAYMENT-RESPONSE` (V2) or `X-PAYMENT-RESPONSE` (V1).

use http::HeaderMap;
use serde_json::{Value, json};
#[cfg(feature = "telemetry")]
use tracing::debug;
use x402_actions::encoding::Base64Bytes;
use x402_actions::proto::PaymentRequired;

use crate::constants::{PAYMENT_REQUIRED_HEADER, PAYMENT_RESPONSE_HEADER, X_PAYMENT_RESPONSE_HEADER};

/// Reads payment requirements from a 402 response.
///
/// The header wins when it is present, decodes and lists at least one
/// option; otherwise the body is used as is, even with an empty `accepts`
/// list, so the caller can report that nothing payable was offered.
#[must_use]
pub fn payment_required_from_parts(headers: &HeaderMap, body: &[u8]) -> Option<PaymentRequired> {
    let from_header = headers
        .get(PAYMENT_REQUIRED_HEADER)
        .and_then(|h| Base64Bytes::from(h.as_bytes()).decode_json::<PaymentRequired>().ok())
        .filter(|required| !required.accepts.is_empty());
    if let Some(required) = from_header {
        #[cfg(feature = "telemetry")]
        debug!(version = required.x402_version, "Parsed payment requirements from header");
        return Some(required);
    }

    let from_body = serde_json::from_slice::<PaymentRequired>(body).ok();

    #[cfg(feature = "telemetry")]
    if from_body.is_none() {
        debug!("Could not parse payment requirements from response");
    }

    from_body
}

/// Reads the settlement proof, if the server sent one.
///
/// Base64 JSON is decoded; anything else is returned as `{"raw": value}`.
#[must_use]
pub fn settlement_proof(headers: &HeaderMap) -> Option<Value> {
    let header = headers
        .get(PAYMENT_RESPONSE_HEADER)
        .or_else(|| headers.get(X_PAYMENT_RESPONSE_HEADER))?;
    let decoded = Base64Bytes::from(header.as_bytes()).decode_json::<Value>();
    Some(decoded.unwrap_or_else(|_| json!({ "raw": String::from_utf8_lossy(header.as_bytes()) })))
}

#[cfg(test)]
mod tests {
    use http::HeaderValue;
    use serde_json::json;

    use super::*;

    fn encoded(value: &Value) -> HeaderValue {
        Base64Bytes::encode_json(value)
            .unwrap()
            .to_string()
            .parse()
            .unwrap()
    }

    fn accepts(network: &str) -> Value {
        json!([{"scheme": "exact", "network": network, "asset": "0xa", "amount": "1"}])
    }

    #[test]
    fn test_header_beats_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            PAYMENT_REQUIRED_HEADER,
            encoded(&json!({"x402Version": 2, "accepts": accepts("eip155:8453")})),
        );
        let body = json!({"x402Version": 1, "accepts": accepts("base")}).to_string();
        let required = payment_required_from_parts(&headers, body.as_bytes()).unwrap();
        assert_eq!(required.x402_version, 2);
        assert_eq!(required.accepts[0].network, "eip155:8453");
    }

    #[test]
    fn test_empty_header_falls_back_to_body() {
        let mut headers = HeaderMap::new();
        headers.insert(
            PAYMENT_REQUIRED_HEADER,
            encoded(&json!({"x402Version": 2, "accepts": []})),
        );
        let body = json!({"accepts": accepts("base")}).to_string();
        let required = payment_required_from_parts(&headers, body.as_bytes()).unwrap();
        assert_eq!(required.x402_version, 1);
        assert_eq!(required.accepts[0].network, "base");
    }

    #[test]
    fn test_body_with_empty_accepts_is_kept() {
        let body = json!({"x402Version": 1, "accepts": []}).to_string();
        let required = payment_required_from_parts(&HeaderMap::new(), body.as_bytes()).unwrap();
        assert!(required.accepts.is_empty());

        let mut headers = HeaderMap::new();
        headers.insert(
            PAYMENT_REQUIRED_HEADER,
            encoded(&json!({"x402Version": 2, "accepts": []})),
        );
        let required = payment_required_from_parts(&headers, body.as_bytes()).unwrap();
        assert_eq!(required.x402_version, 1);
    }

    #[test]
    fn test_garbage_header_falls_back_to_body() {
        let mut headers = HeaderMap::new();
        headers.insert(PAYMENT_REQUIRED_HEADER, HeaderValue::from_static("%%%"));
        let body = json!({"accepts": accepts("base")}).to_string();
        assert!(payment_required_from_parts(&headers, body.as_bytes()).is_some());
        assert!(payment_required_from_parts(&headers, b"not json").is_none());
    }

    #[test]
    fn test_settlement_proof() {
        let mut headers = HeaderMap::new();
        assert!(settlement_proof(&headers).is_none());

        headers.insert(X_PAYMENT_RESPONSE_HEADER, HeaderValue::from_static("opaque"));
        assert_eq!(settlement_proof(&headers), Some(json!({"raw": "opaque"})));

        headers.insert(
            PAYMENT_RESPONSE_HEADER,
            encoded(&json!({"success": true, "transaction": "0xabc"})),
        );
        assert_eq!(
            settlement_proof(&headers),
            Some(json!({"success": true, "transaction": "0xabc"}))
        );
    }
}
