#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! Solana support for x402 agent actions.
//!
//! Solana wallets can list, discover and filter x402 services against the
//! Solana USDC mints, but paying is not supported: the wallet provider here
//! is watch-only and reports [`WalletCapability::Svm`].
//!
//! [`WalletCapability::Svm`]: x402_actions::wallet::WalletCapability::Svm

mod networks;
pub mod wallet;

pub use networks::*;
pub use wallet::SvmWalletProvider;
