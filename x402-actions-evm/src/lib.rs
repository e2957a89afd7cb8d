#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! EIP-155 (EVM) support for x402 agent actions.
//!
//! Provides the EVM entries of the network registry and a payment signer
//! for the "exact" scheme, which authorizes a USDC transfer with an ERC-3009
//! `transferWithAuthorization` signature. Both protocol versions are
//! supported: V1 addresses networks by name and sends `X-PAYMENT`, V2 uses
//! CAIP-2 chain ids and sends `PAYMENT-SIGNATURE`.
//!
//! # Modules
//!
//! - [`chain`] - Resolving x402 network identifiers to EIP-155 chain ids
//! - [`exact`] - ERC-3009 signing for the "exact" scheme
//! - [`wallet`] - A local-key wallet provider
//!
//! # Feature Flags
//!
//! - `telemetry` - Enables tracing instrumentation

pub mod chain;
pub mod exact;
pub mod wallet;

mod networks;
pub use networks::*;

pub use exact::ExactEvmSigner;
pub use wallet::EvmWalletProvider;
