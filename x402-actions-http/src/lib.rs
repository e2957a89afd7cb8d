#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! HTTP transport for x402 agent actions.
//!
//! # Modules
//!
//! - [`constants`] - Header names and defaults
//! - [`discovery`] - Paginated discovery listing with retry and backoff
//! - [`error`] - Transport and payment errors
//! - [`headers`] - Reading 402 challenges and settlement proofs
//! - [`middleware`] - `reqwest-middleware` layer that pays 402 challenges
//! - [`negotiation`] - The request / challenge / pay flow
//! - [`request`] - Request descriptions and response decoding
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod constants;
pub mod discovery;
pub mod error;
pub mod headers;
pub mod middleware;
pub mod negotiation;
pub mod request;

#[cfg(test)]
mod test_support;

pub use discovery::{DiscoveryClient, DiscoveryOutcome, RetryPolicy};
pub use error::{HttpError, PaymentError};
pub use middleware::X402Payments;
pub use negotiation::{Negotiation, Negotiator, PaymentOutcome};
pub use request::{HttpMethod, HttpOutcome, HttpRequestSpec};
