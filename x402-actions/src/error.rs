//! Errors surfaced to the agent.
//!
//! Every variant maps to one refusal or failure the agent can act on. The
//! [`Display`](std::fmt::Display) text is the short `message` of the rendered
//! payload; [`ActionError::details`] is the longer explanation.

use crate::proto::PaymentOption;

/// Why an action did not complete.
#[derive(Debug, Clone, thiserror::Error)]
#[non_exhaustive]
pub enum ActionError {
    /// The URL is not on the service allow-list.
    #[error("Service not registered")]
    ServiceNotRegistered {
        /// The rejected URL.
        url: String,
    },

    /// The facilitator name is neither known nor registered.
    #[error("Facilitator not allowed")]
    FacilitatorNotAllowed {
        /// The requested facilitator.
        name: String,
        /// Names that would have been accepted.
        allowed: Vec<String>,
    },

    /// A 402 challenge offered nothing payable in USDC.
    #[error("No USDC payment option available")]
    NoUsdcOption {
        /// The options the server did offer.
        original_options: Vec<PaymentOption>,
    },

    /// The selected option is not denominated in USDC.
    #[error("Only USDC payments are supported")]
    NotUsdc {
        /// The rejected asset.
        asset: String,
    },

    /// The payment network is not the wallet's network.
    #[error("Network mismatch")]
    NetworkMismatch {
        /// Identifiers of the wallet network.
        wallet_networks: Vec<String>,
        /// Network the payment requires.
        required: String,
    },

    /// The payment is above the configured ceiling.
    #[error("Payment exceeds limit")]
    PaymentExceedsLimit {
        /// Requested amount in USDC.
        requested: String,
        /// Configured ceiling in USDC.
        max: String,
    },

    /// The wallet cannot sign x402 payments.
    #[error("Unsupported wallet provider")]
    UnsupportedWalletProvider,

    /// Runtime service registration is turned off.
    #[error("Dynamic service registration is disabled")]
    DynamicRegistrationDisabled,

    /// A URL argument could not be parsed.
    #[error("Invalid URL format")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
    },

    /// Arguments did not match the action schema.
    #[error("Invalid arguments")]
    InvalidArguments(String),

    /// The discovery listing was empty.
    #[error("No services found")]
    NoServicesFound,

    /// The server answered with an error status.
    #[error("HTTP {status} error when accessing {url}")]
    Http {
        /// Requested URL.
        url: String,
        /// Response status.
        status: u16,
        /// Error text from the response body, if any.
        details: String,
    },

    /// The request never produced a response.
    #[error("Network error when accessing {url}")]
    Network {
        /// Requested URL.
        url: String,
        /// Transport error text.
        details: String,
    },

    /// Any other request failure.
    #[error("Error making request to {url}")]
    Request {
        /// Requested URL.
        url: String,
        /// Error text.
        details: String,
    },

    /// The payment could not be produced for the server's challenge.
    #[error("Payment failed")]
    PaymentRejected(String),

    /// Some discovery pages could not be fetched.
    #[error("Discovery listing incomplete")]
    PaginationExhausted {
        /// Offsets of the skipped pages.
        skipped_offsets: Vec<u64>,
    },
}

impl ActionError {
    /// Longer explanation shown next to the message.
    #[must_use]
    pub fn details(&self) -> String {
        match self {
            Self::ServiceNotRegistered { url } => format!(
                "The service URL \"{url}\" is not registered. Only approved services can be called."
            ),
            Self::FacilitatorNotAllowed { name, allowed } => format!(
                "The facilitator \"{name}\" is not recognized. Use one of: {}",
                allowed.join(", ")
            ),
            Self::NoUsdcOption { .. } => {
                "This service does not accept USDC payments. Only USDC payments are supported."
                    .to_owned()
            }
            Self::NotUsdc { asset } => {
                format!("The selected payment asset \"{asset}\" is not USDC.")
            }
            Self::NetworkMismatch {
                wallet_networks,
                required,
            } => format!(
                "Wallet is on {} but payment requires {required}",
                wallet_networks.join(", ")
            ),
            Self::PaymentExceedsLimit { requested, max } => format!(
                "The requested payment of {requested} USDC exceeds the maximum spending limit of {max} USDC."
            ),
            Self::UnsupportedWalletProvider => {
                "Only EVM wallet providers are currently supported for x402 payments".to_owned()
            }
            Self::DynamicRegistrationDisabled => "The agent is configured with \
                allow_dynamic_service_registration: false. Services must be pre-registered."
                .to_owned(),
            Self::InvalidUrl { url } => format!("\"{url}\" is not a valid URL."),
            Self::InvalidArguments(details)
            | Self::Http { details, .. }
            | Self::Network { details, .. }
            | Self::Request { details, .. }
            | Self::PaymentRejected(details) => details.clone(),
            Self::NoServicesFound => "The facilitator returned no resources.".to_owned(),
            Self::PaginationExhausted { skipped_offsets } => format!(
                "Skipped discovery pages at offsets: {}",
                skipped_offsets
                    .iter()
                    .map(u64::to_string)
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }

    /// Next step for the agent, for the errors that have one.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::Http { .. } => Some("Check if the URL is correct and the API is available."),
            Self::Network { .. } => Some(
                "Check your internet connection and verify the API endpoint is accessible.",
            ),
            Self::Request { .. } => Some("Please check the request parameters and try again."),
            _ => None,
        }
    }
}
