//! EIP-155 chain id resolution.

use crate::networks::EVM_NETWORKS;

/// CAIP-2 namespace for EVM chains.
pub const EIP155_NAMESPACE: &str = "eip155";

/// Resolves an x402 network identifier to an EIP-155 chain id.
///
/// Accepts CAIP-2 ids (`eip155:8453`), V1 names (`base`) and wallet network
/// ids (`base-mainnet`). Returns `None` for anything else.
#[must_use]
pub fn chain_id_for(network: &str) -> Option<u64> {
    if let Some((namespace, reference)) = network.split_once(':') {
        return (namespace == EIP155_NAMESPACE)
            .then(|| reference.parse().ok())
            .flatten();
    }
    EVM_NETWORKS
        .iter()
        .find(|info| info.name == network || info.network_id == network)
        .and_then(|info| info.reference.parse().ok())
}
