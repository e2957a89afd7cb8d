//! A wallet backed by a local private key.

use std::sync::Arc;

use alloy_signer_local::PrivateKeySigner;
use x402_actions::chain::Network;
use x402_actions::scheme::PaymentSigner;
use x402_actions::wallet::{WalletCapability, WalletProvider};

use crate::exact::{ExactEvmSigner, SignerLike};
use crate::networks::EVM_NETWORKS;

/// Errors from building a wallet.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The key is not a valid secp256k1 private key.
    #[error("Invalid private key: {0}")]
    InvalidKey(String),
}

/// An EVM wallet that pays with the "exact" scheme.
#[derive(Clone)]
pub struct EvmWalletProvider {
    network: Network,
    signer: Arc<dyn PaymentSigner>,
}

impl std::fmt::Debug for EvmWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvmWalletProvider")
            .field("network", &self.network)
            .field("address", &self.signer.address())
            .finish()
    }
}

impl EvmWalletProvider {
    /// Creates a wallet on `network_id` signing with `signer`.
    ///
    /// Known networks get their CAIP-2 chain id filled in.
    pub fn new<S: SignerLike + 'static>(signer: S, network_id: &str) -> Self {
        let mut network = Network::evm(network_id);
        network.chain_id = EVM_NETWORKS
            .iter()
            .find(|info| info.network_id == network_id)
            .map(|info| info.chain_id().to_string());
        Self {
            network,
            signer: Arc::new(ExactEvmSigner::new(signer)),
        }
    }

    /// Creates a wallet from a hex private key, with or without `0x`.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InvalidKey`] if the key does not parse.
    pub fn from_private_key(private_key: &str, network_id: &str) -> Result<Self, WalletError> {
        let signer: PrivateKeySigner = private_key
            .trim()
            .parse()
            .map_err(|e: alloy_signer_local::LocalSignerError| WalletError::InvalidKey(e.to_string()))?;
        Ok(Self::new(signer, network_id))
    }
}

impl WalletProvider for EvmWalletProvider {
    fn network(&self) -> Network {
        self.network.clone()
    }

    fn address(&self) -> String {
        self.signer.address()
    }

    fn capability(&self) -> WalletCapability {
        WalletCapability::Evm(Arc::clone(&self.signer))
    }
}
