//! Chain identifiers and wallet network descriptors.
//!
//! - [`ChainId`] - A CAIP-2 identifier (e.g., `eip155:8453` for Base)
//! - [`ProtocolFamily`] - The signing family a wallet belongs to
//! - [`Network`] - What a wallet reports about the chain it is connected to

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// A CAIP-2 compliant blockchain identifier.
///
/// The format is `namespace:reference`, where the namespace identifies the
/// chain family (`eip155`, `solana`) and the reference the chain within it.
///
/// Serializes to/from a colon-separated string: `"eip155:8453"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainId {
    namespace: String,
    reference: String,
}

impl ChainId {
    /// Creates a new chain ID from namespace and reference components.
    pub fn new<N: Into<String>, R: Into<String>>(namespace: N, reference: R) -> Self {
        Self {
            namespace: namespace.into(),
            reference: reference.into(),
        }
    }

    /// Returns the namespace component of the chain ID.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns the reference component of the chain ID.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.reference)
    }
}

/// Error returned when parsing an invalid chain ID string.
#[derive(Debug, thiserror::Error)]
#[error("Invalid chain id format {0}")]
pub struct ChainIdFormatError(String);

impl FromStr for ChainId {
    type Err = ChainIdFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(':') {
            Some((namespace, reference)) if !namespace.is_empty() && !reference.is_empty() => {
                Ok(Self::new(namespace, reference))
            }
            _ => Err(ChainIdFormatError(s.into())),
        }
    }
}

impl Serialize for ChainId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for ChainId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::from_str(&s).map_err(de::Error::custom)
    }
}

/// Signing family of a wallet.
///
/// Only EVM wallets can currently produce x402 payments; Solana wallets are
/// recognised so that their networks and USDC mints can be listed and
/// filtered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolFamily {
    /// Ethereum-compatible chains (`eip155` namespace).
    Evm,
    /// Solana (`solana` namespace).
    #[serde(alias = "solana")]
    Svm,
}

impl ProtocolFamily {
    /// CAIP-2 namespace used by this family.
    #[must_use]
    pub const fn namespace(self) -> &'static str {
        match self {
            Self::Evm => "eip155",
            Self::Svm => "solana",
        }
    }
}

impl fmt::Display for ProtocolFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Evm => f.write_str("evm"),
            Self::Svm => f.write_str("svm"),
        }
    }
}

/// The network a wallet is connected to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    /// Signing family of the wallet.
    pub protocol_family: ProtocolFamily,
    /// Wallet-level network id such as `base-mainnet` or `solana-devnet`.
    pub network_id: String,
    /// Chain reference (EVM chain id, Solana genesis hash prefix), if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chain_id: Option<String>,
}

impl Network {
    /// Creates a network descriptor without a chain reference.
    pub fn new<S: Into<String>>(protocol_family: ProtocolFamily, network_id: S) -> Self {
        Self {
            protocol_family,
            network_id: network_id.into(),
            chain_id: None,
        }
    }

    /// Shorthand for an EVM network.
    pub fn evm<S: Into<String>>(network_id: S) -> Self {
        Self::new(ProtocolFamily::Evm, network_id)
    }

    /// Shorthand for a Solana network.
    pub fn svm<S: Into<String>>(network_id: S) -> Self {
        Self::new(ProtocolFamily::Svm, network_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chain_id_serialize_eip155() {
        let chain_id = ChainId::new("eip155", "8453");
        let serialized = serde_json::to_string(&chain_id).unwrap();
        assert_eq!(serialized, "\"eip155:8453\"");
    }

    #[test]
    fn test_chain_id_deserialize_solana() {
        let chain_id: ChainId =
            serde_json::from_str("\"solana:5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp\"").unwrap();
        assert_eq!(chain_id.namespace(), "solana");
        assert_eq!(chain_id.reference(), "5eykt4UsFv8P8NJdTREpY1vzqKqZKvdp");
    }

    #[test]
    fn test_chain_id_rejects_missing_parts() {
        assert!("base".parse::<ChainId>().is_err());
        assert!(":8453".parse::<ChainId>().is_err());
        assert!("eip155:".parse::<ChainId>().is_err());
    }

    #[test]
    fn test_protocol_family_accepts_solana_alias() {
        let family: ProtocolFamily = serde_json::from_str("\"solana\"").unwrap();
        assert_eq!(family, ProtocolFamily::Svm);
        assert_eq!(serde_json::to_string(&ProtocolFamily::Evm).unwrap(), "\"evm\"");
    }

    #[test]
    fn test_network_deserialize() {
        let network: Network =
            serde_json::from_str(r#"{"protocolFamily":"evm","networkId":"base-sepolia"}"#)
                .unwrap();
        assert_eq!(network, Network::evm("base-sepolia"));
    }
}
