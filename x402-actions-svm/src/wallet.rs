//! Watch-only Solana wallet.

use std::str::FromStr;

use solana_pubkey::Pubkey;
use x402_actions::chain::Network;
use x402_actions::wallet::{WalletCapability, WalletProvider};

use crate::networks::SOLANA_NETWORKS;

/// Errors from building a wallet.
#[derive(Debug, thiserror::Error)]
pub enum WalletError {
    /// The address is not a base58 public key.
    #[error("Invalid Solana address: {0}")]
    InvalidAddress(String),
}

/// A Solana wallet identified by its public key.
#[derive(Debug, Clone)]
pub struct SvmWalletProvider {
    network: Network,
    address: Pubkey,
}

impl SvmWalletProvider {
    /// Creates a wallet for `address` on `network_id`.
    ///
    /// # Errors
    ///
    /// Returns [`WalletError::InvalidAddress`] if `address` is not a public key.
    pub fn new(address: &str, network_id: &str) -> Result<Self, WalletError> {
        let address = Pubkey::from_str(address.trim())
            .map_err(|e| WalletError::InvalidAddress(format!("{address}: {e}")))?;
        let mut network = Network::svm(network_id);
        network.chain_id = SOLANA_NETWORKS
            .iter()
            .find(|info| info.network_id == network_id)
            .map(|info| info.chain_id().to_string());
        Ok(Self { network, address })
    }

    /// The wallet's public key.
    #[must_use]
    pub const fn pubkey(&self) -> &Pubkey {
        &self.address
    }
}

impl WalletProvider for SvmWalletProvider {
    fn network(&self) -> Network {
        self.network.clone()
    }

    fn address(&self) -> String {
        self.address.to_string()
    }

    fn capability(&self) -> WalletCapability {
        WalletCapability::Svm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_only_wallet() {
        let wallet =
            SvmWalletProvider::new("9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM", "solana-devnet")
                .unwrap();
        assert_eq!(
            wallet.network().chain_id.as_deref(),
            Some("solana:EtWTRABZaYq6iMfeYKouRu166VU2xqa1")
        );
        assert!(wallet.capability().payment_signer().is_none());
    }

    #[test]
    fn test_rejects_bad_address() {
        assert!(SvmWalletProvider::new("0xnot-base58", "solana-mainnet").is_err());
    }
}
