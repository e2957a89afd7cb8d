//! Provider configuration.
//!
//! # Environment Variables
//!
//! - `X402_ALLOW_DYNAMIC_SERVICE_REGISTRATION` - `"true"` (any case) turns on
//!   runtime service registration when the configuration leaves it off
//! - `X402_MAX_PAYMENT_USDC` - Spending ceiling in whole USDC, used only when
//!   the configuration keeps the default of `1.0`
//!
//! Both are read once, when the provider is built.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amount;
use crate::facilitators::FacilitatorDirectory;
use crate::limit::PaymentLimit;
use crate::registry::ServiceRegistry;

/// Environment variable enabling dynamic service registration.
pub const ENV_ALLOW_DYNAMIC_REGISTRATION: &str = "X402_ALLOW_DYNAMIC_SERVICE_REGISTRATION";

/// Environment variable holding the spending ceiling.
pub const ENV_MAX_PAYMENT_USDC: &str = "X402_MAX_PAYMENT_USDC";

/// Configuration of the x402 action provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct X402Config {
    /// Service URLs (origins or prefixes) the agent may call.
    pub registered_services: Vec<String>,
    /// Whether the agent may add services at runtime.
    pub allow_dynamic_service_registration: bool,
    /// Custom facilitators, name to base URL.
    pub registered_facilitators: BTreeMap<String, String>,
    /// Maximum payment per request in whole USDC.
    pub max_payment_usdc: Decimal,
}

impl Default for X402Config {
    fn default() -> Self {
        Self {
            registered_services: Vec::new(),
            allow_dynamic_service_registration: false,
            registered_facilitators: BTreeMap::new(),
            max_payment_usdc: Decimal::ONE,
        }
    }
}

impl X402Config {
    /// Applies the process environment fallbacks.
    #[must_use]
    pub fn resolve_env(self) -> Self {
        self.resolve_with(|key| std::env::var(key).ok())
    }

    /// Applies environment fallbacks read through `lookup`.
    #[must_use]
    pub fn resolve_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if !self.allow_dynamic_service_registration {
            self.allow_dynamic_service_registration = lookup(ENV_ALLOW_DYNAMIC_REGISTRATION)
                .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"));
        }

        if self.max_payment_usdc == Decimal::ONE {
            if let Some(raw) = lookup(ENV_MAX_PAYMENT_USDC) {
                match amount::parse_decimal(&raw) {
                    Ok(max) if !max.is_sign_negative() => self.max_payment_usdc = max,
                    _ => {
                        #[cfg(feature = "telemetry")]
                        tracing::warn!(value = %raw, "Ignoring invalid {ENV_MAX_PAYMENT_USDC}");
                    }
                }
            }
        }

        self
    }

    /// The service allow-list seeded from this configuration.
    #[must_use]
    pub fn service_registry(&self) -> ServiceRegistry {
        self.registered_services.iter().cloned().collect()
    }

    /// The facilitator directory seeded from this configuration.
    #[must_use]
    pub fn facilitator_directory(&self) -> FacilitatorDirectory {
        FacilitatorDirectory::new(self.registered_facilitators.clone())
    }

    /// The spending ceiling.
    #[must_use]
    pub const fn payment_limit(&self) -> PaymentLimit {
        PaymentLimit::new(self.max_payment_usdc)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::str::FromStr;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = X402Config::default().resolve_with(env(&[]));
        assert!(!config.allow_dynamic_service_registration);
        assert_eq!(config.max_payment_usdc, Decimal::ONE);
        assert!(config.service_registry().is_empty());
    }

    #[test]
    fn test_env_enables_dynamic_registration() {
        let config = X402Config::default()
            .resolve_with(env(&[(ENV_ALLOW_DYNAMIC_REGISTRATION, "TRUE")]));
        assert!(config.allow_dynamic_service_registration);
        let config = X402Config::default()
            .resolve_with(env(&[(ENV_ALLOW_DYNAMIC_REGISTRATION, "yes")]));
        assert!(!config.allow_dynamic_service_registration);
    }

    #[test]
    fn test_env_max_only_overrides_default() {
        let config =
            X402Config::default().resolve_with(env(&[(ENV_MAX_PAYMENT_USDC, "0.25")]));
        assert_eq!(config.max_payment_usdc, Decimal::from_str("0.25").unwrap());

        let explicit = X402Config {
            max_payment_usdc: Decimal::from(5),
            ..X402Config::default()
        }
        .resolve_with(env(&[(ENV_MAX_PAYMENT_USDC, "0.25")]));
        assert_eq!(explicit.max_payment_usdc, Decimal::from(5));
    }

    #[test]
    fn test_invalid_env_max_is_ignored() {
        let config = X402Config::default().resolve_with(env(&[(ENV_MAX_PAYMENT_USDC, "lots")]));
        assert_eq!(config.max_payment_usdc, Decimal::ONE);
        let config = X402Config::default().resolve_with(env(&[(ENV_MAX_PAYMENT_USDC, "-1")]));
        assert_eq!(config.max_payment_usdc, Decimal::ONE);
    }

    #[test]
    fn test_deserialize_partial() {
        let config: X402Config = serde_json::from_str(
            r#"{"registered_services": ["https://api.example.com"], "max_payment_usdc": "0.5"}"#,
        )
        .unwrap();
        assert!(config.service_registry().is_allowed("https://api.example.com/x"));
        assert_eq!(config.payment_limit().max_atomic(), 500_000);
    }
}
