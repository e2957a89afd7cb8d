//! The 402 negotiation flow.
//!
//! ```text
//! request ──non-402──▶ Completed
//!    │
//!   402 ──no USDC option──────────▶ Rejected(NoUsdcOption)
//!    │  ──USDC, wrong network─────▶ Rejected(NetworkMismatch)
//!    └──────────────────────────────▶ Challenged
//!
//! pay(selected) ──200──▶ Settled
//!               └─────▶ Failed
//! ```
//!
//! A challenge is surfaced to the agent rather than paid on the spot; the
//! agent then calls [`Negotiator::pay`] with one of the surfaced options.
//! [`Negotiator::request_with_payment`] collapses both steps, choosing the
//! first affordable option itself.

use http::StatusCode;
use reqwest::Response;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use serde_json::Value;
#[cfg(feature = "telemetry")]
use tracing::{info, instrument};
use url::Url;
use x402_actions::ActionError;
use x402_actions::filter::{self, WalletNetworks};
use x402_actions::limit::PaymentLimit;
use x402_actions::networks::NetworkRegistry;
use x402_actions::proto::{PaymentOption, PaymentRequired};
use x402_actions::registry::ServiceRegistry;
use x402_actions::scheme::{FirstAffordable, PaymentSelector, PaymentSigner, PinnedOption};
use x402_actions::wallet::WalletCapability;

use crate::error::{PaymentError, middleware_error};
use crate::headers::{payment_required_from_parts, settlement_proof};
use crate::middleware::X402Payments;
use crate::request::{HttpMethod, HttpOutcome, HttpRequestSpec, parse_response_data};

/// A 402 challenge as seen from the agent's wallet.
#[derive(Debug, Clone, PartialEq)]
pub struct Challenge {
    /// Final URL, query included.
    pub url: String,
    /// Verb that drew the challenge.
    pub method: HttpMethod,
    /// The challenge as sent.
    pub required: PaymentRequired,
    /// Offered options denominated in the wallet network's USDC.
    pub usdc_options: Vec<PaymentOption>,
    /// USDC options on the wallet network.
    pub matching: Vec<PaymentOption>,
    /// `matching`, rendered as e.g. `"0.01 USDC on base-mainnet"`.
    pub formatted: Vec<String>,
}

impl Challenge {
    /// Discovery metadata carried by the challenge.
    #[must_use]
    pub fn discovery_info(&self) -> Option<Value> {
        self.required.discovery_info()
    }
}

/// Why a challenge cannot be paid.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    /// Nothing offered is USDC.
    NoUsdcOption {
        /// Every offered option.
        original_options: Vec<PaymentOption>,
    },
    /// USDC is offered, but not on the wallet network.
    NetworkMismatch(Challenge),
}

/// Result of a first request.
#[derive(Debug, Clone, PartialEq)]
pub enum Negotiation {
    /// The server answered without asking for payment.
    Completed(HttpOutcome),
    /// Payment is required and possible.
    Challenged(Challenge),
    /// Payment is required and impossible.
    Rejected(Rejection),
}

/// Result of a paid retry.
#[derive(Debug, Clone, PartialEq)]
pub enum PaymentOutcome {
    /// The server answered 200; the payment went through.
    Settled(HttpOutcome),
    /// Anything else; the payment was not settled.
    Failed(HttpOutcome),
}

/// Drives requests through the 402 flow.
#[derive(Debug, Clone)]
pub struct Negotiator {
    client: reqwest::Client,
    networks: NetworkRegistry,
}

impl Negotiator {
    /// Creates a negotiator sharing `client`.
    #[must_use]
    pub const fn new(client: reqwest::Client, networks: NetworkRegistry) -> Self {
        Self { client, networks }
    }

    /// The network registry used to render prices.
    #[must_use]
    pub const fn networks(&self) -> &NetworkRegistry {
        &self.networks
    }

    /// Sends `spec` without paying.
    ///
    /// A 404 to GET or DELETE is retried once with the other verb.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::ServiceNotRegistered`] for URLs off the
    /// allow-list, and request errors for transport failures.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.negotiate.request", skip_all, fields(url = %spec.url), err)
    )]
    pub async fn request(
        &self,
        services: &ServiceRegistry,
        wallet: &WalletNetworks,
        spec: &HttpRequestSpec,
    ) -> Result<Negotiation, ActionError> {
        check_allowed(services, spec)?;
        let url = build_url(spec)?;
        let client = ClientBuilder::new(self.client.clone()).build();

        let mut method = spec.method;
        let mut res = send(&client, spec, &url, method).await?;
        if res.status() == StatusCode::NOT_FOUND
            && let Some(fallback) = method.not_found_fallback()
        {
            #[cfg(feature = "telemetry")]
            info!(from = %method, to = %fallback, "Got 404, retrying with another method");
            method = fallback;
            res = send(&client, spec, &url, method).await?;
        }

        if res.status() != StatusCode::PAYMENT_REQUIRED {
            return Ok(Negotiation::Completed(read_outcome(res, &url, method).await?));
        }

        let headers = res.headers().clone();
        let body = res.bytes().await.map_err(|e| ActionError::Request {
            url: url.to_string(),
            details: e.to_string(),
        })?;
        let required = payment_required_from_parts(&headers, &body)
            .ok_or_else(|| ActionError::PaymentRejected(PaymentError::InvalidChallenge.to_string()))?;

        Ok(self.assess(required, wallet, &url, method))
    }

    fn assess(
        &self,
        required: PaymentRequired,
        wallet: &WalletNetworks,
        url: &Url,
        method: HttpMethod,
    ) -> Negotiation {
        let usdc_options = filter::filter_usdc(&required.accepts, wallet);
        if usdc_options.is_empty() {
            return Negotiation::Rejected(Rejection::NoUsdcOption {
                original_options: required.accepts,
            });
        }
        let matching = filter::filter_matching_network(&usdc_options, wallet);
        let formatted = matching
            .iter()
            .map(|option| wallet.format_option(option, &self.networks))
            .collect();
        let challenge = Challenge {
            url: url.to_string(),
            method,
            required,
            usdc_options,
            matching,
            formatted,
        };
        if challenge.matching.is_empty() {
            Negotiation::Rejected(Rejection::NetworkMismatch(challenge))
        } else {
            Negotiation::Challenged(challenge)
        }
    }

    /// Retries `spec` paying exactly `selected`.
    ///
    /// Checks run in order: allow-list, USDC, spending limit, network, wallet.
    /// The server must still offer the same terms on the retry.
    ///
    /// # Errors
    ///
    /// Returns the first failed check, [`ActionError::PaymentRejected`] when
    /// the terms are gone or signing fails, and request errors.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.negotiate.pay", skip_all, fields(url = %spec.url), err)
    )]
    pub async fn pay(
        &self,
        services: &ServiceRegistry,
        wallet: &WalletNetworks,
        capability: &WalletCapability,
        limit: &PaymentLimit,
        spec: &HttpRequestSpec,
        selected: &PaymentOption,
    ) -> Result<PaymentOutcome, ActionError> {
        check_allowed(services, spec)?;
        if !wallet.is_usdc(&selected.asset) {
            return Err(ActionError::NotUsdc {
                asset: selected.asset.clone(),
            });
        }
        let amount = selected.amount().ok_or_else(|| {
            ActionError::InvalidArguments(
                "selected_payment_option has no amount (maxAmountRequired, amount or price)"
                    .to_owned(),
            )
        })?;
        limit.check(amount).into_result()?;
        if !wallet.matches(&selected.network) {
            return Err(ActionError::NetworkMismatch {
                wallet_networks: wallet.identifiers().to_vec(),
                required: selected.network.clone(),
            });
        }
        let signer = capability
            .payment_signer()
            .ok_or(ActionError::UnsupportedWalletProvider)?;

        let outcome = self
            .send_paying(signer, PinnedOption(selected.clone()), spec)
            .await?;
        Ok(if outcome.is_ok() {
            PaymentOutcome::Settled(outcome)
        } else {
            PaymentOutcome::Failed(outcome)
        })
    }

    /// Sends `spec`, paying any 402 with the first USDC option on the wallet
    /// network within `limit`.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::ServiceNotRegistered`],
    /// [`ActionError::UnsupportedWalletProvider`],
    /// [`ActionError::PaymentRejected`] when nothing offered is acceptable,
    /// and request errors.
    #[cfg_attr(
        feature = "telemetry",
        instrument(name = "x402.negotiate.request_with_payment", skip_all, fields(url = %spec.url), err)
    )]
    pub async fn request_with_payment(
        &self,
        services: &ServiceRegistry,
        wallet: &WalletNetworks,
        capability: &WalletCapability,
        limit: &PaymentLimit,
        spec: &HttpRequestSpec,
    ) -> Result<HttpOutcome, ActionError> {
        check_allowed(services, spec)?;
        let signer = capability
            .payment_signer()
            .ok_or(ActionError::UnsupportedWalletProvider)?;
        self.send_paying(signer, FirstAffordable::new(wallet.clone(), *limit), spec)
            .await
    }

    async fn send_paying<S: PaymentSelector + 'static>(
        &self,
        signer: std::sync::Arc<dyn PaymentSigner>,
        selector: S,
        spec: &HttpRequestSpec,
    ) -> Result<HttpOutcome, ActionError> {
        let url = build_url(spec)?;
        let client = ClientBuilder::new(self.client.clone())
            .with(X402Payments::new(signer, selector))
            .build();
        let res = send(&client, spec, &url, spec.method).await?;
        read_outcome(res, &url, spec.method).await
    }
}

fn check_allowed(services: &ServiceRegistry, spec: &HttpRequestSpec) -> Result<(), ActionError> {
    if services.is_allowed(&spec.url) {
        Ok(())
    } else {
        Err(ActionError::ServiceNotRegistered {
            url: spec.url.clone(),
        })
    }
}

fn build_url(spec: &HttpRequestSpec) -> Result<Url, ActionError> {
    spec.build_url().map_err(|e| e.into_action_error(&spec.url))
}

async fn send(
    client: &ClientWithMiddleware,
    spec: &HttpRequestSpec,
    url: &Url,
    method: HttpMethod,
) -> Result<Response, ActionError> {
    spec.send_as(client, url.clone(), method)
        .await
        .map_err(|e| middleware_error(e, url.as_str()))
}

async fn read_outcome(res: Response, url: &Url, method: HttpMethod) -> Result<HttpOutcome, ActionError> {
    let status = res.status().as_u16();
    let headers = res.headers().clone();
    let body = res.bytes().await.map_err(|e| ActionError::Request {
        url: url.to_string(),
        details: e.to_string(),
    })?;
    Ok(HttpOutcome {
        url: url.to_string(),
        method,
        status,
        data: parse_response_data(&headers, &body),
        payment_proof: settlement_proof(&headers),
    })
}
