//! HTTP constants for the x402 protocol.

use std::time::Duration;

/// V2 payment header (client to server).
pub const PAYMENT_SIGNATURE_HEADER: &str = "payment-signature";

/// V2 challenge header (server to client).
pub const PAYMENT_REQUIRED_HEADER: &str = "payment-required";

/// V2 settlement header (server to client).
pub const PAYMENT_RESPONSE_HEADER: &str = "payment-response";

/// V1 payment header (client to server).
pub const X_PAYMENT_HEADER: &str = "x-payment";

/// V1 settlement header (server to client).
pub const X_PAYMENT_RESPONSE_HEADER: &str = "x-payment-response";

/// Path of the discovery listing below a facilitator URL.
pub const DISCOVERY_RESOURCES_PATH: &str = "/discovery/resources";

/// Page size requested from the discovery listing.
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Per-request timeout of the shared client.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
