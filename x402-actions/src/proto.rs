//! Wire types for x402 payment challenges and discovery listings.
//!
//! Both protocol versions are read through the same types. Version 1 names
//! the price `maxAmountRequired` and uses legacy network names; version 2
//! names it `amount` (or `price`) and uses CAIP-2 identifiers. Fields the
//! agent does not interpret are kept verbatim in `extra_fields`, so an option
//! surfaced to the agent can be echoed back and matched exactly.
//!
//! # Key Types
//!
//! - [`PaymentOption`] - One entry of a challenge's `accepts` list
//! - [`PaymentRequired`] - A 402 challenge (v1 body or v2 header)
//! - [`DiscoveryResource`] - One entry of a facilitator's discovery listing
//! - [`DiscoveryPage`] - One page of the discovery listing
//! - [`SimplifiedResource`] - Discovery entry reduced for an LLM

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use serde_with::{VecSkipError, serde_as};

use crate::amount::{self, AmountError};

/// Description servers attach when they did not bother writing one.
pub const PLACEHOLDER_DESCRIPTION: &str = "Access to protected content";

/// A single way of paying for a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOption {
    /// Payment scheme, e.g. `"exact"`.
    #[serde(default)]
    pub scheme: String,
    /// Network identifier, v1 name or CAIP-2.
    #[serde(default)]
    pub network: String,
    /// Token contract or mint address.
    #[serde(default)]
    pub asset: String,
    /// Version 1 price in atomic units.
    #[serde(
        default,
        alias = "max_amount_required",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_amount_required: Option<String>,
    /// Version 2 price in atomic units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    /// Alternative version 2 price field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<String>,
    /// Recipient address.
    #[serde(default, alias = "pay_to", skip_serializing_if = "Option::is_none")]
    pub pay_to: Option<String>,
    /// Human-readable description (version 1 listings put it here).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Everything else (`resource`, `mimeType`, `maxTimeoutSeconds`, `extra`, ...).
    #[serde(flatten)]
    pub extra_fields: Map<String, Value>,
}

impl PaymentOption {
    /// The price in atomic units as sent on the wire.
    ///
    /// Reads `maxAmountRequired`, then `amount`, then `price`; blank values are
    /// skipped.
    #[must_use]
    pub fn amount(&self) -> Option<&str> {
        [&self.max_amount_required, &self.amount, &self.price]
            .into_iter()
            .filter_map(Option::as_deref)
            .find(|s| !s.trim().is_empty())
    }

    /// The price parsed as an atomic integer.
    ///
    /// # Errors
    ///
    /// Returns [`AmountError::Empty`] when no price field is present and
    /// another [`AmountError`] when it is not an integer.
    pub fn amount_atomic(&self) -> Result<u128, AmountError> {
        self.amount()
            .ok_or(AmountError::Empty)
            .and_then(amount::parse_atomic)
    }

    /// Recipient address, if the option names one.
    #[must_use]
    pub fn recipient(&self) -> Option<&str> {
        self.pay_to.as_deref()
    }

    /// `maxTimeoutSeconds`, if present.
    #[must_use]
    pub fn max_timeout_seconds(&self) -> Option<u64> {
        self.extra_fields
            .get("maxTimeoutSeconds")
            .and_then(Value::as_u64)
    }

    /// Scheme-specific `extra` object, if present.
    #[must_use]
    pub fn extra(&self) -> Option<&Value> {
        self.extra_fields.get("extra")
    }

    /// Whether two options describe the same payment terms.
    ///
    /// Compares scheme, network, asset, price and recipient. Hex addresses are
    /// compared case-insensitively; anything else must match exactly.
    #[must_use]
    pub fn same_terms(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.network == other.network
            && same_address(&self.asset, &other.asset)
            && self.amount() == other.amount()
            && match (self.recipient(), other.recipient()) {
                (Some(a), Some(b)) => same_address(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

fn same_address(a: &str, b: &str) -> bool {
    if a.starts_with("0x") || a.starts_with("0X") {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

const fn default_x402_version() -> u8 {
    1
}

/// A 402 challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequired {
    /// Protocol version; version 1 bodies sometimes omit it.
    #[serde(default = "default_x402_version")]
    pub x402_version: u8,
    /// Acceptable payment options.
    #[serde(default)]
    pub accepts: Vec<PaymentOption>,
    /// Server-provided error string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Version 2 resource descriptor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Value>,
    /// Version 2 resource description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Version 2 resource MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Version 2 protocol extensions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Value>,
}

impl PaymentRequired {
    /// Discovery metadata (`description`, `mimeType`, `extensions`) carried by
    /// version 2 challenges, or `None` when the challenge has none.
    #[must_use]
    pub fn discovery_info(&self) -> Option<Value> {
        let mut info = Map::new();
        if let Some(description) = self.description.as_ref().filter(|d| !d.is_empty()) {
            info.insert("description".into(), Value::String(description.clone()));
        }
        if let Some(mime_type) = self.mime_type.as_ref().filter(|m| !m.is_empty()) {
            info.insert("mimeType".into(), Value::String(mime_type.clone()));
        }
        if let Some(extensions) = self.extensions.as_ref().filter(|e| is_present(e)) {
            info.insert("extensions".into(), extensions.clone());
        }
        (!info.is_empty()).then_some(Value::Object(info))
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// One entry of a facilitator's discovery listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoveryResource {
    /// Resource URL (both versions).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<String>,
    /// Resource URL as some version 2 listings name it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Resource type, e.g. `"http"`.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Version 2 metadata (holds the description).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Payment options for this resource.
    #[serde(default)]
    pub accepts: Vec<PaymentOption>,
    /// Protocol version the resource speaks, when listed.
    #[serde(
        default,
        alias = "x402_version",
        skip_serializing_if = "Option::is_none"
    )]
    pub x402_version: Option<u8>,
    /// Last listing update.
    #[serde(
        default,
        alias = "last_updated",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_updated: Option<String>,
}

impl DiscoveryResource {
    /// The resource URL, or `""` if the listing omits it.
    #[must_use]
    pub fn url(&self) -> &str {
        self.resource
            .as_deref()
            .filter(|s| !s.is_empty())
            .or(self.url.as_deref())
            .unwrap_or_default()
    }

    /// Version-aware description.
    ///
    /// Version 2 reads `metadata.description`; everything else reads the first
    /// non-blank `accepts[].description`.
    #[must_use]
    pub fn description(&self) -> &str {
        if self.x402_version == Some(2) {
            return self
                .metadata
                .as_ref()
                .and_then(|m| m.get("description"))
                .and_then(Value::as_str)
                .unwrap_or_default();
        }
        self.accepts
            .iter()
            .filter_map(|option| option.description.as_deref())
            .find(|d| !d.trim().is_empty())
            .unwrap_or_default()
    }
}

/// Pagination block of a discovery page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Total number of resources in the listing.
    #[serde(default)]
    pub total: u64,
}

/// One page of a discovery listing.
///
/// Entries that do not decode are dropped; the rest of the page is kept.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryPage {
    /// Resources on this page.
    #[serde_as(as = "VecSkipError<_>")]
    #[serde(default, alias = "items")]
    pub resources: Vec<DiscoveryResource>,
    /// Pagination info.
    #[serde(default)]
    pub pagination: Pagination,
}

/// A discovery entry reduced to what an LLM needs to pick a service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedResource {
    /// Resource URL.
    pub url: String,
    /// Formatted price, e.g. `"0.01 USDC on base-mainnet"`.
    pub price: String,
    /// Resource description.
    pub description: String,
}
