//! Registry of networks a wallet may pay on.
//!
//! The same chain travels under three names: the wallet network id
//! (`base-mainnet`), the legacy x402 v1 name (`base`) and the CAIP-2
//! identifier used by x402 v2 (`eip155:8453`). A payment option naming either
//! of the last two must be treated as the wallet's own network.
//!
//! Concrete network data lives in the chain crates:
//!
//! - `x402-actions-evm` provides `EVM_NETWORKS` for Base
//! - `x402-actions-svm` provides `SOLANA_NETWORKS` for Solana
//!
//! Applications assemble a [`NetworkRegistry`] from these slices at startup.

use std::collections::HashMap;

use crate::chain::{ChainId, Network, ProtocolFamily};

/// A supported network together with its USDC deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    /// Wallet network id (e.g., `"base-mainnet"`, `"solana-devnet"`).
    pub network_id: &'static str,
    /// Legacy x402 v1 network name (e.g., `"base"`, `"solana-devnet"`).
    pub name: &'static str,
    /// CAIP-2 namespace (e.g., `"eip155"`, `"solana"`).
    pub namespace: &'static str,
    /// CAIP-2 reference (e.g., `"8453"`).
    pub reference: &'static str,
    /// Signing family of wallets on this network.
    pub family: ProtocolFamily,
    /// USDC contract address (EVM) or mint address (Solana).
    pub usdc: &'static str,
}

impl NetworkInfo {
    /// Create a [`ChainId`] from this network info.
    #[must_use]
    pub fn chain_id(&self) -> ChainId {
        ChainId::new(self.namespace, self.reference)
    }

    /// Every identifier an x402 payment option may use for this network,
    /// legacy name first.
    #[must_use]
    pub fn x402_networks(&self) -> Vec<String> {
        vec![self.name.to_owned(), self.chain_id().to_string()]
    }
}

/// Lookup table from any network identifier to its [`NetworkInfo`].
///
/// # Example
///
/// ```ignore
/// use x402_actions::networks::NetworkRegistry;
///
/// let registry = NetworkRegistry::from_networks(x402_actions_evm::EVM_NETWORKS)
///     .with_networks(x402_actions_svm::SOLANA_NETWORKS);
///
/// assert_eq!(registry.network_id_for("eip155:8453"), "base-mainnet");
/// ```
#[derive(Debug, Clone, Default)]
pub struct NetworkRegistry {
    by_network_id: HashMap<&'static str, NetworkInfo>,
    by_identifier: HashMap<String, &'static str>,
}

impl NetworkRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry pre-populated from a network info slice.
    #[must_use]
    pub fn from_networks(networks: &[NetworkInfo]) -> Self {
        let mut registry = Self::new();
        registry.register(networks);
        registry
    }

    /// Registers additional networks into this registry.
    pub fn register(&mut self, networks: &[NetworkInfo]) {
        for info in networks {
            self.by_network_id.insert(info.network_id, *info);
            for identifier in info.x402_networks() {
                self.by_identifier.insert(identifier, info.network_id);
            }
        }
    }

    /// Builder-style method: registers additional networks and returns `self`.
    #[must_use]
    pub fn with_networks(mut self, networks: &[NetworkInfo]) -> Self {
        self.register(networks);
        self
    }

    /// Looks up a network by its wallet network id.
    #[must_use]
    pub fn info(&self, network_id: &str) -> Option<&NetworkInfo> {
        self.by_network_id.get(network_id)
    }

    /// Looks up a network by a v1 name or CAIP-2 identifier.
    #[must_use]
    pub fn info_by_identifier(&self, identifier: &str) -> Option<&NetworkInfo> {
        self.by_identifier
            .get(identifier)
            .and_then(|id| self.by_network_id.get(id))
    }

    /// Identifiers that payment options may use for a wallet network.
    ///
    /// Unknown networks map to `[network_id]` so that an exact match still
    /// works.
    #[must_use]
    pub fn x402_networks(&self, network_id: &str) -> Vec<String> {
        self.info(network_id).map_or_else(
            || vec![network_id.to_owned()],
            NetworkInfo::x402_networks,
        )
    }

    /// Maps an x402 network identifier back to the wallet network id.
    ///
    /// Identifiers that are not registered are returned unchanged.
    #[must_use]
    pub fn network_id_for(&self, identifier: &str) -> String {
        self.by_identifier
            .get(identifier)
            .map_or_else(|| identifier.to_owned(), |id| (*id).to_owned())
    }

    /// USDC deployment on a wallet network, if known.
    #[must_use]
    pub fn usdc_address(&self, network_id: &str) -> Option<&'static str> {
        self.info(network_id).map(|info| info.usdc)
    }

    /// Whether a wallet on `network` can use the x402 actions at all.
    #[must_use]
    pub fn supports(&self, network: &Network) -> bool {
        self.info(&network.network_id)
            .is_some_and(|info| info.family == network.protocol_family)
    }

    /// Supported wallet network ids, sorted.
    #[must_use]
    pub fn network_ids(&self) -> Vec<&'static str> {
        let mut ids: Vec<_> = self.by_network_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of registered networks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_network_id.len()
    }

    /// Returns `true` if no networks are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_network_id.is_empty()
    }
}
