#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Core types for x402 agent payment actions.
//!
//! An agent that calls paid HTTP services through the x402 protocol needs a
//! small amount of policy before it is allowed to spend anything: which
//! services it may talk to, which payment options it is able to honour, and
//! how much it may spend on a single request. This crate holds that policy
//! layer, independent of any HTTP client or blockchain SDK.
//!
//! # Modules
//!
//! - [`amount`] - Atomic unit / human decimal conversion
//! - [`chain`] - CAIP-2 chain identifiers and wallet network descriptors
//! - [`config`] - Provider configuration with environment fallbacks
//! - [`encoding`] - Base64 helpers for x402 headers
//! - [`error`] - Error taxonomy surfaced to the agent
//! - [`facilitators`] - Known and custom facilitator directory
//! - [`filter`] - USDC/network option filters and discovery filters
//! - [`limit`] - Spending ceiling validation
//! - [`networks`] - Registry of supported networks and USDC deployments
//! - [`proto`] - Wire types for 402 challenges and discovery listings
//! - [`registry`] - Service allow-list
//! - [`scheme`] - Payment signer and selector traits
//! - [`wallet`] - Wallet provider seam
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod amount;
pub mod chain;
pub mod config;
pub mod encoding;
pub mod error;
pub mod facilitators;
pub mod filter;
pub mod limit;
pub mod networks;
pub mod proto;
pub mod registry;
pub mod scheme;
pub mod wallet;

pub use error::ActionError;
