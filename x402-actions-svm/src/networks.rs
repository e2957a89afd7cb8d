//! Known Solana networks and their USDC mints.

use solana_pubkey::{Pubkey, pubkey};
use x402_actions::chain::ProtocolFamily;
use x402_actions::networks::NetworkInfo;

/// Circle USDC mint on Solana mainnet.
pub const USDC_SOLANA: Pubkey = pubkey!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");
/// Circle USDC mint on Solana devnet.
pub const USDC_SOLANA_DEVNET: Pubkey = pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");

/// Solana networks known to the actions.
pub const SOLANA_NETWORKS: &[NetworkInfo] = &[
    NetworkInfo {
        network_id: "solana-mainnet",
        name: "solana",
        namespace: "solana",
        reference: "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp",
        family: ProtocolFamily::Svm,
        usdc: "EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v",
    },
    NetworkInfo {
        network_id: "solana-devnet",
        name: "solana-devnet",
        namespace: "solana",
        reference: "EtWTRABZaYq6iMfeYKouRu166VU2xqa1",
        family: ProtocolFamily::Svm,
        usdc: "4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU",
    },
];
