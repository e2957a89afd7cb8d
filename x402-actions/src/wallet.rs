//! The wallet seam.
//!
//! Key management and RPC access belong to the host application. The actions
//! only need to know which network a wallet is on and whether it can sign an
//! x402 payment, which is what [`WalletProvider`] exposes.

use std::sync::Arc;

use crate::chain::Network;
use crate::scheme::PaymentSigner;

/// What a wallet can do for the x402 actions.
#[derive(Clone)]
pub enum WalletCapability {
    /// An EVM wallet that can sign payments.
    Evm(Arc<dyn PaymentSigner>),
    /// A Solana wallet. Listing and filtering work; paying does not.
    Svm,
    /// Any other wallet.
    Generic,
}

impl std::fmt::Debug for WalletCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Evm(signer) => f
                .debug_tuple("Evm")
                .field(&signer.address())
                .finish(),
            Self::Svm => f.write_str("Svm"),
            Self::Generic => f.write_str("Generic"),
        }
    }
}

impl WalletCapability {
    /// The payment signer, when the wallet has one.
    #[must_use]
    pub fn payment_signer(&self) -> Option<Arc<dyn PaymentSigner>> {
        match self {
            Self::Evm(signer) => Some(Arc::clone(signer)),
            Self::Svm | Self::Generic => None,
        }
    }
}

/// A wallet as the actions see it.
pub trait WalletProvider: Send + Sync {
    /// The network the wallet is connected to.
    fn network(&self) -> Network;

    /// The wallet's address.
    fn address(&self) -> String;

    /// What the wallet can do.
    fn capability(&self) -> WalletCapability;
}
