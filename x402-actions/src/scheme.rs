//! Payment signing and selection seams.
//!
//! A [`PaymentSigner`] turns one accepted [`PaymentOption`] into the header a
//! resource server expects. A [`PaymentSelector`] decides which of the
//! offered options that should be. Chain crates implement the signer; the
//! two selectors here cover the two payment flows: paying for an option the
//! agent already chose, and choosing automatically under policy.

use std::fmt::{self, Debug, Formatter};
use std::future::Future;
use std::pin::Pin;

use crate::filter::WalletNetworks;
use crate::limit::PaymentLimit;
use crate::proto::{PaymentOption, PaymentRequired};

/// Boxed future returned by [`PaymentSigner::sign_payment`].
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A signed payment ready to attach to the retried request.
#[derive(Clone, PartialEq, Eq)]
pub struct SignedPayment {
    /// Lowercase header name (`payment-signature` or `x-payment`).
    pub header: &'static str,
    /// Base64 header value.
    pub value: String,
}

impl Debug for SignedPayment {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignedPayment")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Errors from producing a signed payment.
#[derive(Debug, thiserror::Error)]
pub enum SignerError {
    /// The option cannot be paid by this signer (wrong scheme or network).
    #[error("Unsupported payment option: {0}")]
    Unsupported(String),
    /// A field of the option is malformed.
    #[error("Invalid payment option: {0}")]
    InvalidOption(String),
    /// The signature itself failed.
    #[error("Failed to sign payment: {0}")]
    Signing(String),
    /// The payload could not be encoded.
    #[error("Failed to encode payment: {0}")]
    Encoding(String),
}

/// Produces x402 payment headers.
pub trait PaymentSigner: Send + Sync {
    /// Payment scheme handled by this signer (e.g., `"exact"`).
    fn scheme(&self) -> &str;

    /// Address that pays.
    fn address(&self) -> String;

    /// Signs `selected`, one of `required.accepts`.
    fn sign_payment<'a>(
        &'a self,
        required: &'a PaymentRequired,
        selected: &'a PaymentOption,
    ) -> BoxFuture<'a, Result<SignedPayment, SignerError>>;
}

/// Chooses the option to pay from a challenge.
pub trait PaymentSelector: Send + Sync {
    /// Selects an option from `accepts`, or `None` if nothing is acceptable.
    fn select<'a>(&self, accepts: &'a [PaymentOption]) -> Option<&'a PaymentOption>;
}

/// Selects the offered option with the same terms as one chosen earlier.
///
/// A chosen option the server no longer offers is never synthesized.
#[derive(Debug, Clone)]
pub struct PinnedOption(pub PaymentOption);

impl PaymentSelector for PinnedOption {
    fn select<'a>(&self, accepts: &'a [PaymentOption]) -> Option<&'a PaymentOption> {
        accepts.iter().find(|option| option.same_terms(&self.0))
    }
}

/// Selects the first USDC option on the wallet network within the ceiling.
#[derive(Debug, Clone)]
pub struct FirstAffordable {
    wallet: WalletNetworks,
    limit: PaymentLimit,
}

impl FirstAffordable {
    /// Creates a selector for `wallet` under `limit`.
    #[must_use]
    pub const fn new(wallet: WalletNetworks, limit: PaymentLimit) -> Self {
        Self { wallet, limit }
    }
}

impl PaymentSelector for FirstAffordable {
    fn select<'a>(&self, accepts: &'a [PaymentOption]) -> Option<&'a PaymentOption> {
        let max = self.limit.max_atomic();
        accepts.iter().find(|option| {
            self.wallet.matches(&option.network)
                && self.wallet.is_usdc(&option.asset)
                && option.amount_atomic().is_ok_and(|amount| amount <= max)
        })
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use serde_json::json;

    use super::*;
    use crate::chain::Network;
    use crate::networks::NetworkRegistry;
    use crate::networks::fixtures::{self, BASE_USDC};

    fn option(network: &str, asset: &str, amount: &str) -> PaymentOption {
        serde_json::from_value(json!({
            "scheme": "exact",
            "network": network,
            "asset": asset,
            "maxAmountRequired": amount,
            "payTo": "0x0000000000000000000000000000000000000002",
        }))
        .unwrap()
    }

    #[test]
    fn test_pinned_option_finds_same_terms() {
        let accepts = vec![
            option("base", BASE_USDC, "20000"),
            option("base", BASE_USDC, "10000"),
        ];
        let mut chosen = accepts[1].clone();
        chosen.asset = BASE_USDC.to_lowercase();
        let selected = PinnedOption(chosen).select(&accepts).unwrap();
        assert_eq!(selected.amount(), Some("10000"));
    }

    #[test]
    fn test_pinned_option_refuses_vanished_terms() {
        let accepts = vec![option("base", BASE_USDC, "20000")];
        let chosen = option("base", BASE_USDC, "10000");
        assert!(PinnedOption(chosen).select(&accepts).is_none());
    }

    #[test]
    fn test_first_affordable_applies_policy() {
        let registry = NetworkRegistry::from_networks(fixtures::NETWORKS);
        let wallet = WalletNetworks::new(&registry, &Network::evm("base-mainnet"));
        let selector = FirstAffordable::new(wallet, PaymentLimit::new(Decimal::ONE));
        let accepts = vec![
            option("eip155:84532", BASE_USDC, "1"),
            option("base", "0xdead", "1"),
            option("base", BASE_USDC, "2000000"),
            option("eip155:8453", BASE_USDC, "500000"),
        ];
        let selected = selector.select(&accepts).unwrap();
        assert_eq!(selected.network, "eip155:8453");
        assert!(selector.select(&accepts[..3]).is_none());
    }
}
