//! Payment option and discovery filters.
//!
//! All filters are evaluated against one wallet network, captured in a
//! [`WalletNetworks`] view: the identifiers payment options may use for that
//! network and its USDC deployment.

use crate::amount::{self, USDC_DECIMALS};
use crate::chain::{Network, ProtocolFamily};
use crate::networks::NetworkRegistry;
use crate::proto::{DiscoveryResource, PLACEHOLDER_DESCRIPTION, PaymentOption, SimplifiedResource};

/// A wallet network as seen by the filters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletNetworks {
    network: Network,
    identifiers: Vec<String>,
    usdc: Option<&'static str>,
}

impl WalletNetworks {
    /// Resolves a wallet network against the registry.
    #[must_use]
    pub fn new(registry: &NetworkRegistry, network: &Network) -> Self {
        let usdc = registry
            .info(&network.network_id)
            .filter(|info| info.family == network.protocol_family)
            .map(|info| info.usdc);
        Self {
            network: network.clone(),
            identifiers: registry.x402_networks(&network.network_id),
            usdc,
        }
    }

    /// The wallet network.
    #[must_use]
    pub const fn network(&self) -> &Network {
        &self.network
    }

    /// Identifiers payment options may use for the wallet network.
    #[must_use]
    pub fn identifiers(&self) -> &[String] {
        &self.identifiers
    }

    /// Whether an option's network is the wallet network.
    #[must_use]
    pub fn matches(&self, network: &str) -> bool {
        self.identifiers.iter().any(|id| id == network)
    }

    /// Whether `asset` is the USDC deployment on the wallet network.
    ///
    /// EVM addresses compare case-insensitively; Solana mints are base58 and
    /// compare exactly.
    #[must_use]
    pub fn is_usdc(&self, asset: &str) -> bool {
        let Some(usdc) = self.usdc else {
            return false;
        };
        match self.network.protocol_family {
            ProtocolFamily::Evm => asset.eq_ignore_ascii_case(usdc),
            ProtocolFamily::Svm => asset == usdc,
        }
    }

    /// Renders an option's price, e.g. `"0.01 USDC on base-mainnet"`.
    ///
    /// Non-USDC assets and unparseable amounts fall back to
    /// `"{asset} {amount} on {network}"`.
    #[must_use]
    pub fn format_option(&self, option: &PaymentOption, registry: &NetworkRegistry) -> String {
        let network = registry.network_id_for(&option.network);
        let raw = option.amount().unwrap_or("0");
        match amount::parse_atomic(raw) {
            Ok(atomic) if self.is_usdc(&option.asset) => format!(
                "{} USDC on {network}",
                amount::format_units(atomic, USDC_DECIMALS)
            ),
            _ => format!("{} {raw} on {network}", option.asset),
        }
    }
}

/// Options denominated in the wallet network's USDC.
#[must_use]
pub fn filter_usdc(options: &[PaymentOption], wallet: &WalletNetworks) -> Vec<PaymentOption> {
    options
        .iter()
        .filter(|option| wallet.is_usdc(&option.asset))
        .cloned()
        .collect()
}

/// Options on the wallet network.
#[must_use]
pub fn filter_matching_network(
    options: &[PaymentOption],
    wallet: &WalletNetworks,
) -> Vec<PaymentOption> {
    options
        .iter()
        .filter(|option| wallet.matches(&option.network))
        .cloned()
        .collect()
}

/// Resources with at least one option on the wallet network.
#[must_use]
pub fn filter_by_network(
    resources: Vec<DiscoveryResource>,
    wallet: &WalletNetworks,
) -> Vec<DiscoveryResource> {
    resources
        .into_iter()
        .filter(|r| r.accepts.iter().any(|o| wallet.matches(&o.network)))
        .collect()
}

/// Resources with a real description.
#[must_use]
pub fn filter_by_description(resources: Vec<DiscoveryResource>) -> Vec<DiscoveryResource> {
    resources
        .into_iter()
        .filter(|r| {
            let description = r.description().trim();
            !description.is_empty() && description != PLACEHOLDER_DESCRIPTION
        })
        .collect()
}

/// Resources speaking one of `versions`. Unversioned resources are kept.
#[must_use]
pub fn filter_by_x402_version(
    resources: Vec<DiscoveryResource>,
    versions: &[u8],
) -> Vec<DiscoveryResource> {
    resources
        .into_iter()
        .filter(|r| r.x402_version.is_none_or(|v| versions.contains(&v)))
        .collect()
}

/// Resources whose description or URL contains `keyword`, ignoring case.
#[must_use]
pub fn filter_by_keyword(resources: Vec<DiscoveryResource>, keyword: &str) -> Vec<DiscoveryResource> {
    let keyword = keyword.to_lowercase();
    resources
        .into_iter()
        .filter(|r| {
            r.description().to_lowercase().contains(&keyword)
                || r.url().to_lowercase().contains(&keyword)
        })
        .collect()
}

/// Resources with a USDC option on the wallet network priced at or below
/// `max_atomic`.
#[must_use]
pub fn filter_by_max_price(
    resources: Vec<DiscoveryResource>,
    max_atomic: u128,
    wallet: &WalletNetworks,
) -> Vec<DiscoveryResource> {
    resources
        .into_iter()
        .filter(|r| {
            r.accepts.iter().any(|option| {
                wallet.matches(&option.network)
                    && wallet.is_usdc(&option.asset)
                    && option
                        .amount_atomic()
                        .is_ok_and(|amount| amount <= max_atomic)
            })
        })
        .collect()
}

/// Reduces resources to `{url, price, description}` using the first option
/// on the wallet network. Resources without such an option are dropped.
#[must_use]
pub fn format_simplified_resources(
    resources: &[DiscoveryResource],
    wallet: &WalletNetworks,
    registry: &NetworkRegistry,
) -> Vec<SimplifiedResource> {
    resources
        .iter()
        .filter_map(|resource| {
            let option = resource
                .accepts
                .iter()
                .find(|o| wallet.matches(&o.network))?;
            let price = if option.amount().is_some() && !option.asset.is_empty() {
                wallet.format_option(option, registry)
            } else {
                "Unknown".to_owned()
            };
            Some(SimplifiedResource {
                url: resource.url().to_owned(),
                price,
                description: resource.description().to_owned(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::networks::fixtures::{self, BASE_USDC, SOLANA_USDC};

    fn registry() -> NetworkRegistry {
        NetworkRegistry::from_networks(fixtures::NETWORKS)
    }

    fn base_wallet() -> WalletNetworks {
        WalletNetworks::new(&registry(), &Network::evm("base-mainnet"))
    }

    fn option(network: &str, asset: &str, amount: &str) -> PaymentOption {
        serde_json::from_value(json!({
            "scheme": "exact",
            "network": network,
            "asset": asset,
            "amount": amount,
            "payTo": "0x0000000000000000000000000000000000000001",
        }))
        .unwrap()
    }

    fn resource(value: serde_json::Value) -> DiscoveryResource {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_caip2_matches_wallet_network() {
        let wallet = base_wallet();
        assert!(wallet.matches("eip155:8453"));
        assert!(wallet.matches("base"));
        assert!(!wallet.matches("eip155:84532"));
        assert!(!wallet.matches("base-mainnet"));
    }

    #[test]
    fn test_unknown_wallet_network_matches_itself() {
        let wallet = WalletNetworks::new(&registry(), &Network::evm("polygon-mainnet"));
        assert_eq!(wallet.identifiers(), ["polygon-mainnet"]);
        assert!(!wallet.is_usdc(BASE_USDC));
    }

    #[test]
    fn test_usdc_filter_is_case_insensitive_on_evm() {
        let wallet = base_wallet();
        let options = vec![
            option("eip155:8453", &BASE_USDC.to_lowercase(), "10000"),
            option("eip155:8453", "0x4200000000000000000000000000000000000006", "10000"),
        ];
        let usdc = filter_usdc(&options, &wallet);
        assert_eq!(usdc.len(), 1);
        assert_eq!(usdc[0].asset, BASE_USDC.to_lowercase());
    }

    #[test]
    fn test_usdc_filter_is_exact_on_solana() {
        let wallet = WalletNetworks::new(&registry(), &Network::svm("solana-mainnet"));
        assert!(wallet.is_usdc(SOLANA_USDC));
        assert!(!wallet.is_usdc(&SOLANA_USDC.to_lowercase()));
    }

    #[test]
    fn test_family_mismatch_has_no_usdc() {
        let wallet = WalletNetworks::new(&registry(), &Network::svm("base-mainnet"));
        assert!(!wallet.is_usdc(BASE_USDC));
    }

    #[test]
    fn test_format_option() {
        let wallet = base_wallet();
        let registry = registry();
        assert_eq!(
            wallet.format_option(&option("eip155:8453", BASE_USDC, "10000"), &registry),
            "0.01 USDC on base-mainnet"
        );
        assert_eq!(
            wallet.format_option(&option("base", "0xdead", "5"), &registry),
            "0xdead 5 on base-mainnet"
        );
    }

    #[test]
    fn test_discovery_pipeline() {
        let wallet = base_wallet();
        let registry = registry();
        let resources = vec![
            resource(json!({
                "resource": "https://weather.example/today",
                "x402Version": 2,
                "metadata": {"description": "Weather forecast"},
                "accepts": [{"network": "eip155:8453", "asset": BASE_USDC, "amount": "10000"}],
            })),
            resource(json!({
                "resource": "https://placeholder.example",
                "x402Version": 1,
                "accepts": [{"network": "base", "asset": BASE_USDC,
                             "maxAmountRequired": "10000",
                             "description": "Access to protected content"}],
            })),
            resource(json!({
                "resource": "https://other-chain.example",
                "accepts": [{"network": "eip155:1", "asset": BASE_USDC, "amount": "1",
                             "description": "Mainnet data"}],
            })),
            resource(json!({
                "resource": "https://expensive.example/weather",
                "accepts": [{"network": "base", "asset": BASE_USDC,
                             "maxAmountRequired": "5000000", "description": "Premium weather"}],
            })),
            resource(json!({
                "resource": "https://stocks.example",
                "x402Version": 3,
                "accepts": [{"network": "base", "asset": BASE_USDC,
                             "maxAmountRequired": "1", "description": "Stocks"}],
            })),
        ];

        let filtered = filter_by_network(resources, &wallet);
        assert_eq!(filtered.len(), 4);
        let filtered = filter_by_description(filtered);
        assert_eq!(filtered.len(), 3);
        let filtered = filter_by_x402_version(filtered, &[1, 2]);
        assert_eq!(filtered.len(), 2);
        let filtered = filter_by_keyword(filtered, "WEATHER");
        assert_eq!(filtered.len(), 2);
        let filtered = filter_by_max_price(filtered, 1_000_000, &wallet);
        assert_eq!(filtered.len(), 1);

        let simplified = format_simplified_resources(&filtered, &wallet, &registry);
        assert_eq!(
            simplified,
            vec![SimplifiedResource {
                url: "https://weather.example/today".into(),
                price: "0.01 USDC on base-mainnet".into(),
                description: "Weather forecast".into(),
            }]
        );
    }

    #[test]
    fn test_keyword_matches_url() {
        let resources = vec![resource(json!({
            "url": "https://api.example.com/Weather",
            "accepts": [{"description": "Forecasts"}],
        }))];
        assert_eq!(filter_by_keyword(resources, "weather").len(), 1);
    }
}
