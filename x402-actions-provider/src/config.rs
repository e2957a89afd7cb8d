//! Agent configuration for the `x402-agent` command line.
//!
//! Loaded from a TOML file. String values may reference environment
//! variables with `$VAR` or `${VAR}`.
//!
//! # Example Configuration
//!
//! ```toml
//! network = "base-sepolia"
//! private_key = "$AGENT_PRIVATE_KEY"
//!
//! [x402]
//! registered_services = ["https://api.example.com"]
//! allow_dynamic_service_registration = false
//! max_payment_usdc = "0.5"
//!
//! [x402.registered_facilitators]
//! local = "http://localhost:4021"
//! ```
//!
//! # Environment Variables
//!
//! - `X402_CONFIG` - Path to the configuration file (default: `x402.toml`)
//! - Keys referenced by `$VAR` in the file

use std::path::Path;

use serde::Deserialize;
use x402_actions::config::X402Config;
use x402_actions::wallet::WalletProvider;
use x402_actions_evm::EvmWalletProvider;
use x402_actions_svm::{SOLANA_NETWORKS, SvmWalletProvider};

/// Environment variable naming the configuration file.
pub const ENV_CONFIG_PATH: &str = "X402_CONFIG";

/// Configuration file used when [`ENV_CONFIG_PATH`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "x402.toml";

/// Errors raised while loading the configuration or opening the wallet.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Configuration path.
        path: String,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The file is not valid TOML for [`AgentConfig`].
    #[error("Invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// A wallet setting is missing or still references an unset variable.
    #[error("Missing {0} for the configured network")]
    MissingWallet(&'static str),

    /// The wallet setting was rejected.
    #[error("Invalid wallet: {0}")]
    InvalidWallet(String),
}

/// Top-level agent configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentConfig {
    /// Wallet network id (default: `base-sepolia`).
    #[serde(default = "default_network")]
    pub network: String,

    /// Hex private key of the EVM wallet.
    #[serde(default)]
    pub private_key: Option<String>,

    /// Address of the watch-only Solana wallet.
    #[serde(default)]
    pub solana_address: Option<String>,

    /// x402 action settings.
    #[serde(default)]
    pub x402: X402Config,
}

fn default_network() -> String {
    "base-sepolia".to_owned()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            network: default_network(),
            private_key: None,
            solana_address: None,
            x402: X402Config::default(),
        }
    }
}

impl AgentConfig {
    /// Loads the file named by `X402_CONFIG`, falling back to `x402.toml`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_owned());
        Self::load_from(&path)
    }

    /// Loads configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from(path: &str) -> Result<Self, ConfigError> {
        let content = if Path::new(path).exists() {
            std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                path: path.to_owned(),
                source,
            })?
        } else {
            String::new()
        };
        Self::parse_with(&content, |key| std::env::var(key).ok())
    }

    /// Parses `content`, expanding variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for invalid TOML.
    pub fn parse_with<F>(content: &str, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let expanded = expand_env_vars(content, &lookup);
        let mut config: Self = toml::from_str(&expanded)?;
        config.x402 = config.x402.resolve_with(lookup);
        Ok(config)
    }

    /// Opens the wallet for the configured network.
    ///
    /// Solana networks need `solana_address`; every other network needs
    /// `private_key`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingWallet`] when the setting is absent or
    /// unresolved and [`ConfigError::InvalidWallet`] when it does not parse.
    pub fn wallet(&self) -> Result<Box<dyn WalletProvider>, ConfigError> {
        let is_solana = SOLANA_NETWORKS
            .iter()
            .any(|info| info.network_id == self.network);
        if is_solana {
            let address = resolved(self.solana_address.as_deref())
                .ok_or(ConfigError::MissingWallet("solana_address"))?;
            let wallet = SvmWalletProvider::new(address, &self.network)
                .map_err(|e| ConfigError::InvalidWallet(e.to_string()))?;
            Ok(Box::new(wallet))
        } else {
            let key = resolved(self.private_key.as_deref())
                .ok_or(ConfigError::MissingWallet("private_key"))?;
            let wallet = EvmWalletProvider::from_private_key(key, &self.network)
                .map_err(|e| ConfigError::InvalidWallet(e.to_string()))?;
            Ok(Box::new(wallet))
        }
    }
}

fn resolved(value: Option<&str>) -> Option<&str> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty() && !v.starts_with('$'))
}

/// Expands `$VAR` and `${VAR}` patterns through `lookup`.
///
/// Unresolved variables are left as-is.
fn expand_env_vars<F>(input: &str, lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.next_if_eq(&'{').is_some();

        let mut name = String::new();
        let mut closed = false;
        while let Some(&c) = chars.peek() {
            if braced {
                if c == '}' {
                    chars.next();
                    closed = true;
                    break;
                }
            } else if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            name.push(c);
            chars.next();
        }

        let value = if name.is_empty() || (braced && !closed) {
            None
        } else {
            lookup(&name)
        };
        match value {
            Some(value) => result.push_str(&value),
            None => {
                result.push('$');
                if braced {
                    result.push('{');
                }
                result.push_str(&name);
                if closed {
                    result.push('}');
                }
            }
        }
    }

    result
}
