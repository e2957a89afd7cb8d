//! The x402 action provider.

use reqwest::Client;
use rust_decimal::prelude::ToPrimitive;
use serde_json::{Value, json};
#[cfg(feature = "telemetry")]
use tracing::{info, instrument, warn};
use x402_actions::ActionError;
use x402_actions::chain::Network;
use x402_actions::config::X402Config;
use x402_actions::facilitators::FacilitatorDirectory;
use x402_actions::filter::{self, WalletNetworks};
use x402_actions::limit::PaymentLimit;
use x402_actions::networks::NetworkRegistry;
use x402_actions::registry::ServiceRegistry;
use x402_actions::wallet::WalletProvider;
use x402_actions_evm::EVM_NETWORKS;
use x402_actions_http::constants::{DISCOVERY_RESOURCES_PATH, REQUEST_TIMEOUT};
use x402_actions_http::negotiation::{Challenge, Rejection};
use x402_actions_http::{
    DiscoveryClient, HttpOutcome, HttpRequestSpec, Negotiation, Negotiator, PaymentOutcome,
    RetryPolicy,
};
use x402_actions_svm::SOLANA_NETWORKS;

use crate::action::{ActionDefinition, ActionProvider, ProviderError};
use crate::render::{error_payload, to_pretty};
use crate::schemas::{self, DiscoverArgs, RegisterArgs, RetryArgs};

/// Name of the discovery action.
pub const DISCOVER_X402_SERVICES: &str = "discover_x402_services";
/// Name of the unpaid request action.
pub const MAKE_HTTP_REQUEST: &str = "make_http_request";
/// Name of the paid retry action.
pub const RETRY_HTTP_REQUEST_WITH_X402: &str = "retry_http_request_with_x402";
/// Name of the automatic payment action.
pub const MAKE_HTTP_REQUEST_WITH_X402: &str = "make_http_request_with_x402";
/// Name of the registration action.
pub const REGISTER_X402_SERVICE: &str = "register_x402_service";
/// Name of the service listing action.
pub const LIST_REGISTERED_SERVICES: &str = "list_registered_services";
/// Name of the facilitator listing action.
pub const LIST_REGISTERED_FACILITATORS: &str = "list_registered_facilitators";

const DISCOVER_DESCRIPTION: &str = "Discover available x402 services. Only services available \
on the current network will be returned. Optionally filter by a maximum price in whole units of \
USDC (only USDC payment options will be considered when filter is applied).";

const MAKE_HTTP_REQUEST_DESCRIPTION: &str = "
Makes a basic HTTP request to an API endpoint. If the endpoint requires payment (returns 402),
it will return payment details that can be used with retry_http_request_with_x402.

EXAMPLES:
- Production API: make_http_request(\"https://api.example.com/weather\")
- Local development: make_http_request(\"http://localhost:3000/api/data\")

If you receive a 402 Payment Required response, use retry_http_request_with_x402 to handle the payment.";

const RETRY_DESCRIPTION: &str = "
Retries an HTTP request with x402 payment after receiving a 402 Payment Required response.
This should be used after make_http_request returns a 402 response.

EXAMPLE WORKFLOW:
1. First call make_http_request(\"http://localhost:3000/protected\")
2. If you get a 402 response with acceptablePaymentOptions, use this action to retry with payment
3. CRITICAL: Pass the EXACT payment option object from acceptablePaymentOptions as selected_payment_option.
   Do NOT modify any values - the 'amount' field is in atomic units (e.g., '10000' means 0.01 USDC).

DO NOT use this action directly without first trying make_http_request!";

const DIRECT_DESCRIPTION: &str = "
WARNING: This action automatically handles payments without asking for confirmation!
Only use this when explicitly told to skip the confirmation flow.

For most cases, you should:
1. First try make_http_request
2. Then use retry_http_request_with_x402 if payment is required

This action combines both steps into one, which means:
- No chance to review payment details before paying
- No confirmation step
- Automatic payment processing
- Assumes payment option is compatible with wallet network

EXAMPLES:
- Production: make_http_request_with_x402(\"https://api.example.com/data\")
- Local dev: make_http_request_with_x402(\"http://localhost:3000/protected\")

Unless specifically instructed otherwise, prefer the two-step approach with make_http_request first.";

const REGISTER_DESCRIPTION: &str = "
Registers a service URL for x402 requests. Use this after discovering a service
via discover_x402_services to enable HTTP requests to that service.

NOTE: This action is only available if service discovery is enabled in the agent configuration.
If disabled, services must be pre-registered by the agent administrator.";

const LIST_SERVICES_DESCRIPTION: &str = "
Lists all service URLs that are currently approved for x402 requests.
These are the only services that can be called using make_http_request or make_http_request_with_x402.";

const LIST_FACILITATORS_DESCRIPTION: &str =
    "Lists all facilitators that can be used with discover_x402_services.";

/// Actions for discovering, calling and paying x402 services.
#[derive(Debug, Clone)]
pub struct X402ActionProvider {
    config: X402Config,
    services: ServiceRegistry,
    facilitators: FacilitatorDirectory,
    limit: PaymentLimit,
    networks: NetworkRegistry,
    negotiator: Negotiator,
    discovery: DiscoveryClient,
}

impl X402ActionProvider {
    /// Creates a provider, applying environment fallbacks to `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Client`] if the HTTP client cannot be built.
    pub fn new(config: X402Config) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self::with_client(config.resolve_env(), client))
    }

    /// Creates a provider from an already resolved `config`, sharing `client`.
    #[must_use]
    pub fn with_client(config: X402Config, client: Client) -> Self {
        let networks = NetworkRegistry::from_networks(EVM_NETWORKS).with_networks(SOLANA_NETWORKS);
        Self {
            services: config.service_registry(),
            facilitators: config.facilitator_directory(),
            limit: config.payment_limit(),
            negotiator: Negotiator::new(client.clone(), networks.clone()),
            discovery: DiscoveryClient::new(client),
            networks,
            config,
        }
    }

    /// Replaces the discovery retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.discovery = self.discovery.with_policy(policy);
        self
    }

    /// The effective configuration.
    #[must_use]
    pub const fn config(&self) -> &X402Config {
        &self.config
    }

    fn wallet_networks(&self, wallet: &dyn WalletProvider) -> WalletNetworks {
        WalletNetworks::new(&self.networks, &wallet.network())
    }

    /// Adds the context the agent needs to recover from `err`.
    fn render_error(&self, err: &ActionError) -> Value {
        let mut payload = error_payload(err);
        match err {
            ActionError::ServiceNotRegistered { .. } => {
                payload["registeredServices"] = json!(self.services.iter().collect::<Vec<_>>());
                payload["suggestion"] = json!(if self.config.allow_dynamic_service_registration {
                    "Use register_x402_service to register this service first."
                } else {
                    "Dynamic service registration is disabled. Only pre-registered services can \
                     be used. Set allow_dynamic_service_registration to true in the agent \
                     configuration to enable dynamic service registration."
                });
            }
            ActionError::PaymentExceedsLimit { .. } => {
                payload["maxPaymentUsdc"] = json!(self.limit.max_payment_usdc.to_f64());
            }
            _ => {}
        }
        payload
    }

    /// Lists the services of a facilitator's discovery listing that the
    /// wallet can pay for.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.action.discover", skip(self, wallet))
    )]
    pub async fn discover_x402_services(
        &self,
        wallet: &dyn WalletProvider,
        args: DiscoverArgs,
    ) -> Value {
        if args.max_usdc_price.is_sign_negative() {
            return self.render_error(&ActionError::InvalidArguments(
                "max_usdc_price must be greater than or equal to 0".to_owned(),
            ));
        }
        let base_url = match self.facilitators.resolve(&args.facilitator) {
            Ok(url) => url,
            Err(err) => return self.render_error(&err),
        };

        let outcome = self
            .discovery
            .fetch_all(&format!("{base_url}{DISCOVERY_RESOURCES_PATH}"))
            .await;
        if outcome.resources.is_empty() {
            let mut payload = self.render_error(&ActionError::NoServicesFound);
            if let Some(last_error) = outcome.last_error {
                payload["details"] = json!(last_error);
            }
            return payload;
        }

        let wallet = self.wallet_networks(wallet);
        let total = outcome.resources.len();
        let mut resources = filter::filter_by_network(outcome.resources, &wallet);
        resources = filter::filter_by_description(resources);
        resources = filter::filter_by_x402_version(resources, &args.x402_versions);
        if let Some(keyword) = args.keyword.as_deref().filter(|k| !k.trim().is_empty()) {
            resources = filter::filter_by_keyword(resources, keyword);
        }
        let max_atomic = PaymentLimit::new(args.max_usdc_price).max_atomic();
        resources = filter::filter_by_max_price(resources, max_atomic, &wallet);
        let services = filter::format_simplified_resources(&resources, &wallet, &self.networks);

        #[cfg(feature = "telemetry")]
        info!(total, returned = services.len(), "Discovered x402 services");

        let mut payload = json!({
            "success": true,
            "services": services,
            "walletNetworks": wallet.identifiers(),
            "total": total,
            "returned": services.len(),
        });
        if !outcome.skipped_offsets.is_empty() {
            let warning = ActionError::PaginationExhausted {
                skipped_offsets: outcome.skipped_offsets,
            };
            #[cfg(feature = "telemetry")]
            warn!("{}", warning.details());
            payload["warnings"] = json!([warning.details()]);
        }
        payload
    }

    /// Requests a URL without paying, surfacing any 402 challenge.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.action.request", skip_all, fields(url = %spec.url))
    )]
    pub async fn make_http_request(&self, wallet: &dyn WalletProvider, spec: HttpRequestSpec) -> Value {
        let wallet = self.wallet_networks(wallet);
        match self.negotiator.request(&self.services, &wallet, &spec).await {
            Ok(Negotiation::Completed(outcome)) => json!({
                "success": true,
                "url": outcome.url,
                "method": outcome.method,
                "status": outcome.status,
                "data": outcome.data,
            }),
            Ok(Negotiation::Challenged(challenge)) => payment_required_payload(&challenge, &wallet),
            Ok(Negotiation::Rejected(Rejection::NetworkMismatch(challenge))) => {
                payment_required_payload(&challenge, &wallet)
            }
            Ok(Negotiation::Rejected(Rejection::NoUsdcOption { original_options })) => {
                self.render_error(&ActionError::NoUsdcOption { original_options })
            }
            Err(err) => self.render_error(&err),
        }
    }

    /// Repeats a request, paying the option the agent picked from a 402.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.action.retry", skip_all, fields(url = %args.request.url))
    )]
    pub async fn retry_http_request_with_x402(
        &self,
        wallet: &dyn WalletProvider,
        args: RetryArgs,
    ) -> Value {
        let networks = self.wallet_networks(wallet);
        let selected = args.selected_payment_option;
        let result = self
            .negotiator
            .pay(
                &self.services,
                &networks,
                &wallet.capability(),
                &self.limit,
                &args.request,
                &selected,
            )
            .await;
        match result {
            Ok(PaymentOutcome::Settled(outcome)) => json!({
                "status": "success",
                "data": outcome.data,
                "message": "Request completed successfully with payment",
                "details": {
                    "url": outcome.url,
                    "method": outcome.method,
                    "paymentUsed": {
                        "network": selected.network,
                        "asset": selected.asset,
                        "amount": selected.amount(),
                    },
                    "paymentProof": outcome.payment_proof,
                },
            }),
            Ok(PaymentOutcome::Failed(outcome)) => json!({
                "status": "error",
                "message": not_settled_message(&outcome),
                "httpStatus": outcome.status,
                "data": outcome.data,
                "details": {
                    "url": outcome.url,
                    "method": outcome.method,
                },
            }),
            Err(err) => self.render_error(&err),
        }
    }

    /// Requests a URL, paying any 402 automatically within the limit.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.action.request_with_payment", skip_all, fields(url = %spec.url))
    )]
    pub async fn make_http_request_with_x402(
        &self,
        wallet: &dyn WalletProvider,
        spec: HttpRequestSpec,
    ) -> Value {
        let networks = self.wallet_networks(wallet);
        let result = self
            .negotiator
            .request_with_payment(
                &self.services,
                &networks,
                &wallet.capability(),
                &self.limit,
                &spec,
            )
            .await;
        match result {
            Ok(outcome) if outcome.is_ok() => json!({
                "success": true,
                "message": "Request completed successfully (payment handled automatically if required)",
                "url": outcome.url,
                "method": outcome.method,
                "status": outcome.status,
                "data": outcome.data,
                "paymentProof": outcome.payment_proof,
            }),
            Ok(outcome) => json!({
                "success": false,
                "message": not_settled_message(&outcome),
                "url": outcome.url,
                "method": outcome.method,
                "status": outcome.status,
                "data": outcome.data,
            }),
            Err(err) => self.render_error(&err),
        }
    }

    /// Adds a service to the allow-list, when dynamic registration is on.
    pub fn register_x402_service(&mut self, args: &RegisterArgs) -> Value {
        if !self.config.allow_dynamic_service_registration {
            return self.render_error(&ActionError::DynamicRegistrationDisabled);
        }
        match self.services.register(&args.url) {
            Ok(total) => {
                #[cfg(feature = "telemetry")]
                info!(url = %args.url, total, "Registered x402 service");
                json!({
                    "success": true,
                    "message": "Service registered successfully",
                    "registeredUrl": args.url,
                    "totalRegisteredServices": total,
                })
            }
            Err(_) => self.render_error(&ActionError::InvalidUrl {
                url: args.url.clone(),
            }),
        }
    }

    /// Lists the allow-list.
    #[must_use]
    pub fn list_registered_services(&self) -> Value {
        let services: Vec<&str> = self.services.iter().collect();
        let note = if self.config.allow_dynamic_service_registration {
            "You can register new services using register_x402_service."
        } else {
            "Dynamic service registration is disabled. Only pre-registered services can be used."
        };
        json!({
            "success": true,
            "count": services.len(),
            "registeredServices": services,
            "allowDynamicServiceRegistration": self.config.allow_dynamic_service_registration,
            "note": note,
        })
    }

    /// Lists known and custom facilitators.
    #[must_use]
    pub fn list_registered_facilitators(&self) -> Value {
        let facilitators = self.facilitators.entries();
        let custom = self.facilitators.custom_count();
        json!({
            "success": true,
            "knownCount": facilitators.len() - custom,
            "customCount": custom,
            "totalCount": facilitators.len(),
            "facilitators": facilitators,
            "note": "Use the 'facilitator' parameter in discover_x402_services to query a specific \
                facilitator by name.",
        })
    }

    async fn dispatch(
        &mut self,
        wallet: &dyn WalletProvider,
        action: &str,
        args: Value,
    ) -> Result<Value, ActionError> {
        let invalid = |e: serde_json::Error| ActionError::InvalidArguments(e.to_string());
        Ok(match action {
            DISCOVER_X402_SERVICES => {
                let args = if args.is_null() {
                    DiscoverArgs::default()
                } else {
                    serde_json::from_value(args).map_err(invalid)?
                };
                self.discover_x402_services(wallet, args).await
            }
            MAKE_HTTP_REQUEST => {
                let spec = serde_json::from_value(args).map_err(invalid)?;
                self.make_http_request(wallet, spec).await
            }
            RETRY_HTTP_REQUEST_WITH_X402 => {
                let args = serde_json::from_value(args).map_err(invalid)?;
                self.retry_http_request_with_x402(wallet, args).await
            }
            MAKE_HTTP_REQUEST_WITH_X402 => {
                let spec = serde_json::from_value(args).map_err(invalid)?;
                self.make_http_request_with_x402(wallet, spec).await
            }
            REGISTER_X402_SERVICE => {
                let args: RegisterArgs = serde_json::from_value(args).map_err(invalid)?;
                self.register_x402_service(&args)
            }
            LIST_REGISTERED_SERVICES => self.list_registered_services(),
            LIST_REGISTERED_FACILITATORS => self.list_registered_facilitators(),
            other => return Err(ActionError::InvalidArguments(format!("Unknown action: {other}"))),
        })
    }
}

#[async_trait::async_trait]
impl ActionProvider for X402ActionProvider {
    fn name(&self) -> &'static str {
        "x402"
    }

    fn actions(&self) -> Vec<ActionDefinition> {
        vec![
            ActionDefinition {
                name: DISCOVER_X402_SERVICES,
                description: DISCOVER_DESCRIPTION,
                schema: schemas::discover_schema(),
            },
            ActionDefinition {
                name: MAKE_HTTP_REQUEST,
                description: MAKE_HTTP_REQUEST_DESCRIPTION,
                schema: schemas::http_request_schema(),
            },
            ActionDefinition {
                name: RETRY_HTTP_REQUEST_WITH_X402,
                description: RETRY_DESCRIPTION,
                schema: schemas::retry_schema(),
            },
            ActionDefinition {
                name: MAKE_HTTP_REQUEST_WITH_X402,
                description: DIRECT_DESCRIPTION,
                schema: schemas::http_request_schema(),
            },
            ActionDefinition {
                name: REGISTER_X402_SERVICE,
                description: REGISTER_DESCRIPTION,
                schema: schemas::register_schema(),
            },
            ActionDefinition {
                name: LIST_REGISTERED_SERVICES,
                description: LIST_SERVICES_DESCRIPTION,
                schema: schemas::empty_schema(),
            },
            ActionDefinition {
                name: LIST_REGISTERED_FACILITATORS,
                description: LIST_FACILITATORS_DESCRIPTION,
                schema: schemas::empty_schema(),
            },
        ]
    }

    fn supports_network(&self, network: &Network) -> bool {
        self.networks.supports(network)
    }

    async fn invoke(
        &mut self,
        wallet: &dyn WalletProvider,
        action: &str,
        args: Value,
    ) -> Result<String, ProviderError> {
        if !self.actions().iter().any(|a| a.name == action) {
            return Err(ProviderError::UnknownAction(action.to_owned()));
        }
        #[cfg(feature = "telemetry")]
        info!(action, "Invoking x402 action");
        let payload = self
            .dispatch(wallet, action, args)
            .await
            .unwrap_or_else(|err| self.render_error(&err));
        Ok(to_pretty(&payload))
    }
}

fn not_settled_message(outcome: &HttpOutcome) -> String {
    format!(
        "Request failed with status {}. Payment was not settled.",
        outcome.status
    )
}

/// The 402 result handed back by `make_http_request`.
fn payment_required_payload(challenge: &Challenge, wallet: &WalletNetworks) -> Value {
    let payable = !challenge.matching.is_empty();
    let options_text = if payable {
        format!(
            "The USDC payment options are: {}",
            challenge.formatted.join(", ")
        )
    } else {
        let available: Vec<&str> = challenge
            .usdc_options
            .iter()
            .map(|o| o.network.as_str())
            .collect();
        format!(
            "The wallet networks {} do not match any available USDC payment options ({}).",
            wallet.identifiers().join(", "),
            available.join(", ")
        )
    };

    let mut next_steps = vec![
        "Inform the user that the requested server replied with a 402 Payment Required response."
            .to_owned(),
        options_text,
        "Include the description of the service in the response.".to_owned(),
        "IMPORTANT: Identify required or optional query or body parameters based on this \
         response. If there are any, you must inform the user and request them to provide the \
         values. Always suggest example values."
            .to_owned(),
        "CRITICAL: For POST/PUT/PATCH requests, you MUST use the 'body' parameter (NOT \
         query_params) to send data."
            .to_owned(),
    ];
    if payable {
        next_steps.push("Ask the user if they want to retry the request with payment.".to_owned());
        next_steps.push(
            "CRITICAL: When calling retry_http_request_with_x402, you MUST pass the EXACT payment \
             option object from acceptablePaymentOptions as selected_payment_option. Do NOT \
             modify, interpret, or convert any values. The 'amount' field is in atomic units \
             (e.g., '10000' = 0.01 USDC) and must be passed exactly as-is."
                .to_owned(),
        );
    }

    let mut payload = json!({
        "status": "error_402_payment_required",
        "acceptablePaymentOptions": challenge.usdc_options,
        "nextSteps": next_steps,
    });
    if let Some(info) = challenge.discovery_info() {
        payload["discoveryInfo"] = info;
    }
    payload
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use wiremock::matchers::{header_exists, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use x402_actions_evm::EvmWalletProvider;
    use x402_actions_svm::SvmWalletProvider;

    use super::*;

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const BASE_USDC: &str = "0x833589fCD6eDb6E08f4c7C32D4f71b54bdA02913";
    const PAY_TO: &str = "0x209693Bc6afc0C5328bA36FaF03C514EF312287C";

    fn evm_wallet(network_id: &str) -> EvmWalletProvider {
        EvmWalletProvider::from_private_key(KEY, network_id).unwrap()
    }

    fn provider(server: &MockServer, dynamic: bool) -> X402ActionProvider {
        let config = X402Config {
            registered_services: vec![server.uri()],
            allow_dynamic_service_registration: dynamic,
            registered_facilitators: BTreeMap::from([("local".to_owned(), server.uri())]),
            max_payment_usdc: Decimal::ONE,
        };
        X402ActionProvider::with_client(config, Client::new())
            .with_retry_policy(RetryPolicy::default().without_delays())
    }

    fn usdc_option(network: &str, amount: &str) -> Value {
        json!({
            "scheme": "exact",
            "network": network,
            "asset": BASE_USDC,
            "maxAmountRequired": amount,
            "payTo": PAY_TO,
            "maxTimeoutSeconds": 60,
        })
    }

    fn challenge(accepts: Value) -> ResponseTemplate {
        ResponseTemplate::new(402).set_body_json(json!({
            "x402Version": 1,
            "error": "X-PAYMENT header is required",
            "accepts": accepts,
        }))
    }

    fn discover_args() -> DiscoverArgs {
        DiscoverArgs {
            facilitator: "local".to_owned(),
            ..DiscoverArgs::default()
        }
    }

    #[tokio::test]
    async fn test_discover_keeps_affordable_services_on_wallet_network() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DISCOVERY_RESOURCES_PATH))
            .and(query_param("offset", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "resources": [
                    {
                        "resource": "https://weather.example.com/today",
                        "x402Version": 2,
                        "accepts": [usdc_option("base", "10000")],
                        "metadata": {"description": "Daily weather"},
                    },
                    {
                        "resource": "https://expensive.example.com",
                        "x402Version": 2,
                        "accepts": [usdc_option("base", "5000000")],
                        "metadata": {"description": "Too expensive"},
                    },
                    {
                        "resource": "https://sepolia.example.com",
                        "x402Version": 2,
                        "accepts": [usdc_option("base-sepolia", "10000")],
                        "metadata": {"description": "Wrong network"},
                    },
                    {
                        "resource": "https://placeholder.example.com",
                        "x402Version": 2,
                        "accepts": [usdc_option("eip155:8453", "10000")],
                        "metadata": {"description": "Access to protected content"},
                    },
                ],
                "pagination": {"total": 4},
            })))
            .expect(1)
            .mount(&server)
            .await;

        let payload = provider(&server, false)
            .discover_x402_services(&evm_wallet("base-mainnet"), discover_args())
            .await;

        assert_eq!(payload["success"], true);
        assert_eq!(payload["total"], 4);
        assert_eq!(payload["returned"], 1);
        assert_eq!(
            payload["services"],
            json!([{
                "url": "https://weather.example.com/today",
                "price": "0.01 USDC on base-mainnet",
                "description": "Daily weather",
            }])
        );
        assert_eq!(payload["walletNetworks"], json!(["base", "eip155:8453"]));
        assert!(payload.get("warnings").is_none());
    }

    #[tokio::test]
    async fn test_discover_applies_keyword() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DISCOVERY_RESOURCES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {
                        "resource": "https://weather.example.com",
                        "x402Version": 2,
                        "accepts": [usdc_option("base", "1000")],
                        "metadata": {"description": "Weather forecasts"},
                    },
                    {
                        "resource": "https://news.example.com",
                        "x402Version": 2,
                        "accepts": [usdc_option("base", "1000")],
                        "metadata": {"description": "Headlines"},
                    },
                ],
                "pagination": {"total": 2},
            })))
            .mount(&server)
            .await;

        let args = DiscoverArgs {
            keyword: Some("WEATHER".to_owned()),
            ..discover_args()
        };
        let payload = provider(&server, false)
            .discover_x402_services(&evm_wallet("base-mainnet"), args)
            .await;
        assert_eq!(payload["returned"], 1);
        assert_eq!(payload["services"][0]["url"], "https://weather.example.com");
    }

    #[tokio::test]
    async fn test_discover_rejects_unknown_facilitator() {
        let server = MockServer::start().await;
        let args = DiscoverArgs {
            facilitator: "nobody".to_owned(),
            ..DiscoverArgs::default()
        };
        let payload = provider(&server, false)
            .discover_x402_services(&evm_wallet("base-mainnet"), args)
            .await;
        assert_eq!(payload["error"], true);
        assert_eq!(payload["message"], "Facilitator not allowed");
        assert!(payload["details"].as_str().unwrap().contains("cdp, payai, local"));
    }

    #[tokio::test]
    async fn test_discover_rejects_negative_price() {
        let server = MockServer::start().await;
        let args = DiscoverArgs {
            max_usdc_price: Decimal::from_str("-0.5").unwrap(),
            ..discover_args()
        };
        let payload = provider(&server, false)
            .discover_x402_services(&evm_wallet("base-mainnet"), args)
            .await;
        assert_eq!(payload["message"], "Invalid arguments");
    }

    #[tokio::test]
    async fn test_discover_reports_unreachable_listing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(DISCOVERY_RESOURCES_PATH))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let payload = provider(&server, false)
            .discover_x402_services(&evm_wallet("base-mainnet"), discover_args())
            .await;
        assert_eq!(payload["error"], true);
        assert_eq!(payload["message"], "No services found");
        assert_eq!(payload["details"], "HTTP 503");
    }

    #[tokio::test]
    async fn test_make_http_request_returns_free_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/free"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .mount(&server)
            .await;

        let spec = HttpRequestSpec::get(format!("{}/free", server.uri()));
        let payload = provider(&server, false)
            .make_http_request(&evm_wallet("base-mainnet"), spec)
            .await;
        assert_eq!(payload["success"], true);
        assert_eq!(payload["status"], 200);
        assert_eq!(payload["method"], "GET");
        assert_eq!(payload["data"], json!({"ok": true}));
    }

    #[tokio::test]
    async fn test_make_http_request_surfaces_payment_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paid"))
            .respond_with(challenge(json!([usdc_option("base", "10000")])))
            .mount(&server)
            .await;

        let spec = HttpRequestSpec::get(format!("{}/paid", server.uri()));
        let payload = provider(&server, false)
            .make_http_request(&evm_wallet("base-mainnet"), spec)
            .await;

        assert_eq!(payload["status"], "error_402_payment_required");
        assert_eq!(payload["acceptablePaymentOptions"][0]["maxAmountRequired"], "10000");
        let steps = payload["nextSteps"].as_array().unwrap();
        assert!(
            steps
                .iter()
                .any(|s| s.as_str().unwrap().contains("0.01 USDC on base-mainnet"))
        );
        assert!(
            steps
                .iter()
                .any(|s| s.as_str().unwrap().starts_with("Ask the user"))
        );
    }

    #[tokio::test]
    async fn test_make_http_request_explains_network_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paid"))
            .respond_with(challenge(json!([usdc_option("base", "10000")])))
            .mount(&server)
            .await;

        let spec = HttpRequestSpec::get(format!("{}/paid", server.uri()));
        let payload = provider(&server, false)
            .make_http_request(&evm_wallet("base-sepolia"), spec)
            .await;

        assert_eq!(payload["status"], "error_402_payment_required");
        let steps = payload["nextSteps"].as_array().unwrap();
        assert!(steps[1].as_str().unwrap().contains("do not match"));
        assert!(
            !steps
                .iter()
                .any(|s| s.as_str().unwrap().starts_with("Ask the user"))
        );
    }

    #[tokio::test]
    async fn test_make_http_request_refuses_unregistered_service() {
        let server = MockServer::start().await;
        let spec = HttpRequestSpec::get("https://unknown.example.com/data");

        let payload = provider(&server, true)
            .make_http_request(&evm_wallet("base-mainnet"), spec.clone())
            .await;
        assert_eq!(payload["message"], "Service not registered");
        assert_eq!(payload["registeredServices"], json!([server.uri()]));
        assert!(
            payload["suggestion"]
                .as_str()
                .unwrap()
                .contains("register_x402_service")
        );

        let payload = provider(&server, false)
            .make_http_request(&evm_wallet("base-mainnet"), spec)
            .await;
        assert!(
            payload["suggestion"]
                .as_str()
                .unwrap()
                .starts_with("Dynamic service registration is disabled")
        );
    }

    #[tokio::test]
    async fn test_retry_pays_selected_option() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/paid"))
            .and(header_exists("x-payment"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"weather": "sunny"}))
                    .insert_header("x-payment-response", "eyJzdWNjZXNzIjp0cnVlfQ=="),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/paid"))
            .respond_with(challenge(json!([usdc_option("base", "10000")])))
            .mount(&server)
            .await;

        let args: RetryArgs = serde_json::from_value(json!({
            "url": format!("{}/paid", server.uri()),
            "selected_payment_option": usdc_option("base", "10000"),
        }))
        .unwrap();
        let payload = provider(&server, false)
            .retry_http_request_with_x402(&evm_wallet("base-mainnet"), args)
            .await;

        assert_eq!(payload["status"], "success");
        assert_eq!(payload["data"], json!({"weather": "sunny"}));
        assert_eq!(
            payload["details"]["paymentUsed"],
            json!({"network": "base", "asset": BASE_USDC, "amount": "10000"})
        );
        assert_eq!(payload["details"]["paymentProof"], json!({"success": true}));
    }

    #[tokio::test]
    async fn test_retry_refuses_payment_above_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(0)
            .mount(&server)
            .await;

        let args: RetryArgs = serde_json::from_value(json!({
            "url": format!("{}/paid", server.uri()),
            "selected_payment_option": usdc_option("base", "2500000"),
        }))
        .unwrap();
        let payload = provider(&server, false)
            .retry_http_request_with_x402(&evm_wallet("base-mainnet"), args)
            .await;

        assert_eq!(payload["message"], "Payment exceeds limit");
        assert_eq!(payload["maxPaymentUsdc"], 1.0);
    }

    #[tokio::test]
    async fn test_retry_requires_signing_wallet() {
        let server = MockServer::start().await;
        let wallet = SvmWalletProvider::new(
            "9WzDXwBbmkg8ZTbNMqUxvQRAyrZzDsGYdLVL9zYtAWWM",
            "solana-mainnet",
        )
        .unwrap();
        let mut option = usdc_option("solana", "10000");
        option["asset"] = json!("EPjFWdd5AufqSSqeM2qN1xzybapC8G4wEGGkZwyTDt1v");

        let args: RetryArgs = serde_json::from_value(json!({
            "url": format!("{}/paid", server.uri()),
            "selected_payment_option": option,
        }))
        .unwrap();
        let payload = provider(&server, false)
            .retry_http_request_with_x402(&wallet, args)
            .await;
        assert_eq!(payload["message"], "Unsupported wallet provider");
    }

    #[tokio::test]
    async fn test_direct_request_pays_automatically() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/report"))
            .and(header_exists("x-payment"))
            .respond_with(ResponseTemplate::new(200).set_body_string("done"))
            .with_priority(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/report"))
            .respond_with(challenge(json!([
                usdc_option("base", "9000000"),
                usdc_option("base", "50000"),
            ])))
            .mount(&server)
            .await;

        let spec: HttpRequestSpec = serde_json::from_value(json!({
            "url": format!("{}/report", server.uri()),
            "method": "POST",
            "body": {"topic": "markets"},
        }))
        .unwrap();
        let payload = provider(&server, false)
            .make_http_request_with_x402(&evm_wallet("base-mainnet"), spec)
            .await;

        assert_eq!(payload["success"], true);
        assert_eq!(payload["method"], "POST");
        assert_eq!(payload["data"], "done");
    }

    #[tokio::test]
    async fn test_register_service() {
        let server = MockServer::start().await;

        let mut disabled = provider(&server, false);
        let payload = disabled.register_x402_service(&RegisterArgs {
            url: "https://new.example.com".to_owned(),
        });
        assert_eq!(payload["message"], "Dynamic service registration is disabled");

        let mut enabled = provider(&server, true);
        let payload = enabled.register_x402_service(&RegisterArgs {
            url: "https://new.example.com".to_owned(),
        });
        assert_eq!(payload["success"], true);
        assert_eq!(payload["totalRegisteredServices"], 2);

        let payload = enabled.register_x402_service(&RegisterArgs {
            url: "not a url".to_owned(),
        });
        assert_eq!(payload["message"], "Invalid URL format");

        let listed = enabled.list_registered_services();
        assert_eq!(listed["count"], 2);
        assert_eq!(listed["allowDynamicServiceRegistration"], true);
    }

    #[tokio::test]
    async fn test_list_registered_facilitators() {
        let server = MockServer::start().await;
        let payload = provider(&server, false).list_registered_facilitators();
        assert_eq!(payload["knownCount"], 2);
        assert_eq!(payload["customCount"], 1);
        assert_eq!(payload["totalCount"], 3);
        assert_eq!(payload["facilitators"][2]["name"], "local");
        assert_eq!(payload["facilitators"][2]["type"], "custom");
    }

    #[tokio::test]
    async fn test_invoke_dispatches_and_renders_argument_errors() {
        let server = MockServer::start().await;
        let wallet = evm_wallet("base-mainnet");
        let mut provider = provider(&server, false);

        assert_eq!(provider.actions().len(), 7);
        let text = provider
            .invoke(&wallet, LIST_REGISTERED_SERVICES, Value::Null)
            .await
            .unwrap();
        let payload: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(payload["count"], 1);

        let text = provider
            .invoke(&wallet, MAKE_HTTP_REQUEST, json!({"method": "GET"}))
            .await
            .unwrap();
        let payload: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(payload["message"], "Invalid arguments");

        let err = provider
            .invoke(&wallet, "transfer", Value::Null)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::UnknownAction(name) if name == "transfer"));
    }

    #[test]
    fn test_supports_network() {
        let provider = X402ActionProvider::with_client(X402Config::default(), Client::new());
        assert!(provider.supports_network(&Network::evm("base-mainnet")));
        assert!(provider.supports_network(&Network::evm("base-sepolia")));
        assert!(provider.supports_network(&Network::svm("solana-devnet")));
        assert!(!provider.supports_network(&Network::evm("ethereum-mainnet")));
    }
}
