//! The "exact" payment scheme on EVM chains.
//!
//! The payer signs an ERC-3009 `transferWithAuthorization` for exactly the
//! requested amount. The facilitator submits it on-chain when the resource
//! server settles the payment.

mod signer;
pub mod types;

pub use signer::{
    DEFAULT_MAX_TIMEOUT_SECONDS, Eip3009SigningParams, ExactEvmSigner, SignerLike,
    sign_erc3009_authorization,
};

/// Scheme name on the wire.
pub const EXACT_SCHEME: &str = "exact";
