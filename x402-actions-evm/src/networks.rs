//! Known EVM networks and their USDC deployments.

use alloy_primitives::{Address, address};
use x402_actions::chain::ProtocolFamily;
use x402_actions::networks::NetworkInfo;

/// Base mainnet chain id.
pub const BASE_MAINNET: u64 = 8453;
/// Base Sepolia chain id.
pub const BASE_SEPOLIA: u64 = 84532;

/// USDC on Base mainnet.
pub const USDC_BASE: Address = address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913");
/// USDC on Base Sepolia.
pub const USDC_BASE_SEPOLIA: Address = address!("036CbD53842c5426634e7929541eC2318f3dCF7e");

/// Default EIP-712 domain version of USDC.
pub const DEFAULT_USDC_VERSION: &str = "2";

/// EVM networks the actions can pay on.
pub const EVM_NETWORKS: &[NetworkInfo] = &[
    NetworkInfo {
        network_id: "base-mainnet",
        name: "base",
        namespace: "eip155",
        reference: "8453",
        family: ProtocolFamily::Evm,
        usdc: "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913",
    },
    NetworkInfo {
        network_id: "base-sepolia",
        name: "base-sepolia",
        namespace: "eip155",
        reference: "84532",
        family: ProtocolFamily::Evm,
        usdc: "0x036CbD53842c5426634e7929541eC2318f3dCF7e",
    },
];

/// EIP-712 domain name and version of the USDC contract on `chain_id`.
///
/// The Sepolia deployment registers as `"USDC"`, mainnet as `"USD Coin"`.
#[must_use]
pub const fn usdc_domain(chain_id: u64) -> (&'static str, &'static str) {
    match chain_id {
        BASE_SEPOLIA => ("USDC", DEFAULT_USDC_VERSION),
        _ => ("USD Coin", DEFAULT_USDC_VERSION),
    }
}
