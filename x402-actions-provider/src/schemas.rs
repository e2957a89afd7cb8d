//! Action arguments and their JSON schemas.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};
use x402_actions::facilitators::DEFAULT_FACILITATOR;
use x402_actions::proto::PaymentOption;
use x402_actions_http::HttpRequestSpec;

const URL_DESCRIPTION: &str = "The URL of the API endpoint (can be localhost for development)";

const QUERY_PARAMS_DESCRIPTION: &str = "Query parameters to append to the URL as key-value \
    string pairs. Use ONLY for GET/DELETE requests. For POST/PUT/PATCH, you must use the 'body' \
    parameter instead. Example: {'location': 'NYC', 'units': 'metric'} becomes \
    ?location=NYC&units=metric";

const BODY_DESCRIPTION: &str = "Request body - REQUIRED for POST/PUT/PATCH requests when \
    sending data. Always prefer 'body' over 'query_params' for POST/PUT/PATCH. Do NOT use for \
    GET or DELETE, use query_params instead.";

/// Arguments of `discover_x402_services`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DiscoverArgs {
    /// Facilitator name.
    pub facilitator: String,
    /// Price ceiling in whole USDC.
    pub max_usdc_price: Decimal,
    /// Protocol versions to keep.
    pub x402_versions: Vec<u8>,
    /// Case-insensitive filter on description and URL.
    pub keyword: Option<String>,
}

impl Default for DiscoverArgs {
    fn default() -> Self {
        Self {
            facilitator: DEFAULT_FACILITATOR.to_owned(),
            max_usdc_price: Decimal::ONE,
            x402_versions: vec![1, 2],
            keyword: None,
        }
    }
}

/// Arguments of `retry_http_request_with_x402`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RetryArgs {
    /// The request to repeat.
    #[serde(flatten)]
    pub request: HttpRequestSpec,
    /// The option to pay, exactly as surfaced by the 402 response.
    pub selected_payment_option: PaymentOption,
}

/// Arguments of `register_x402_service`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterArgs {
    /// URL or URL prefix to allow.
    pub url: String,
}

fn request_properties() -> serde_json::Map<String, Value> {
    let properties = json!({
        "url": {"type": "string", "description": URL_DESCRIPTION},
        "method": {
            "type": "string",
            "enum": ["GET", "POST", "PUT", "DELETE", "PATCH"],
            "default": "GET",
            "description": "The HTTP method to use for the request",
        },
        "headers": {
            "type": "object",
            "additionalProperties": {"type": "string"},
            "description": "Optional headers to include in the request",
        },
        "query_params": {
            "type": "object",
            "additionalProperties": {"type": "string"},
            "description": QUERY_PARAMS_DESCRIPTION,
        },
        "body": {"description": BODY_DESCRIPTION},
    });
    match properties {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Schema of `make_http_request` and `make_http_request_with_x402`.
#[must_use]
pub fn http_request_schema() -> Value {
    json!({
        "type": "object",
        "properties": request_properties(),
        "required": ["url"],
    })
}

/// Schema of `retry_http_request_with_x402`.
#[must_use]
pub fn retry_schema() -> Value {
    let mut properties = request_properties();
    properties.insert(
        "selected_payment_option".to_owned(),
        json!({
            "type": "object",
            "description": "The EXACT payment option from acceptablePaymentOptions. Pass the \
                object as-is without modifying any values. The 'amount' field is in atomic units.",
            "properties": {
                "scheme": {"type": "string", "description": "Payment scheme (e.g., 'exact')"},
                "network": {
                    "type": "string",
                    "description": "Network identifier (v1: 'base-sepolia' or v2 CAIP-2: 'eip155:84532')",
                },
                "asset": {"type": "string", "description": "Asset address or identifier"},
                "maxAmountRequired": {"type": "string", "description": "Maximum amount required (v1 format)"},
                "amount": {"type": "string", "description": "Amount required (v2 format)"},
                "price": {"type": "string", "description": "Price (v2 format, e.g., '$0.01')"},
                "payTo": {"type": "string", "description": "Payment recipient address"},
            },
            "required": ["scheme", "network", "asset"],
        }),
    );
    json!({
        "type": "object",
        "properties": properties,
        "required": ["url", "selected_payment_option"],
    })
}

/// Schema of `discover_x402_services`.
#[must_use]
pub fn discover_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "facilitator": {
                "type": "string",
                "default": DEFAULT_FACILITATOR,
                "description": "Facilitator to query: 'cdp' (Coinbase CDP), 'payai' (PayAI) or a \
                    registered custom facilitator name.",
            },
            "max_usdc_price": {
                "type": "number",
                "minimum": 0,
                "default": 1.0,
                "description": "Maximum price in USDC whole units (e.g., 0.1 for 0.10 USDC). Only \
                    USDC payment options will be considered. Defaults to 1.0 USDC.",
            },
            "x402_versions": {
                "type": "array",
                "items": {"type": "integer", "enum": [1, 2]},
                "default": [1, 2],
                "description": "Filter by x402 protocol version (1 or 2). Defaults to accepting both versions.",
            },
            "keyword": {
                "type": "string",
                "description": "Optional keyword to filter services by description (case-insensitive). \
                    Example: 'weather' to find weather-related services.",
            },
        },
    })
}

/// Schema of `register_x402_service`.
#[must_use]
pub fn register_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "url": {"type": "string", "description": "Service URL to register for x402 requests"},
        },
        "required": ["url"],
    })
}

/// Schema of actions without arguments.
#[must_use]
pub fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}})
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_discover_defaults() {
        let args: DiscoverArgs = serde_json::from_value(json!({})).unwrap();
        assert_eq!(args, DiscoverArgs::default());
        assert_eq!(args.facilitator, "cdp");

        let args: DiscoverArgs =
            serde_json::from_value(json!({"max_usdc_price": 0.1, "keyword": "weather"})).unwrap();
        assert_eq!(args.max_usdc_price, Decimal::from_str("0.1").unwrap());
        assert_eq!(args.x402_versions, [1, 2]);
    }

    #[test]
    fn test_retry_args_accept_snake_case_option() {
        let args: RetryArgs = serde_json::from_value(json!({
            "url": "https://api.example.com",
            "method": "POST",
            "body": {"q": 1},
            "selected_payment_option": {
                "scheme": "exact",
                "network": "base-sepolia",
                "asset": "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
                "max_amount_required": "10000",
                "pay_to": "0x0000000000000000000000000000000000000001",
            },
        }))
        .unwrap();
        assert_eq!(args.request.body, Some(json!({"q": 1})));
        assert_eq!(args.selected_payment_option.amount(), Some("10000"));
        assert!(args.selected_payment_option.recipient().is_some());
    }

    #[test]
    fn test_schemas_require_url() {
        assert_eq!(http_request_schema()["required"], json!(["url"]));
        assert_eq!(
            retry_schema()["required"],
            json!(["url", "selected_payment_option"])
        );
        assert_eq!(register_schema()["required"], json!(["url"]));
    }
}
