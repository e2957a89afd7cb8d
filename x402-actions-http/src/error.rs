//! Error types for the HTTP transport.

use x402_actions::ActionError;
use x402_actions::scheme::SignerError;

/// Errors from talking to a server.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// The URL could not be built.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The request produced no response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with an error status.
    #[error("HTTP {status}")]
    Status {
        /// Response status.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body is not the expected JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors from paying a 402 challenge.
#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    /// The 402 response carried no readable payment requirements.
    #[error("Invalid 402 response: no payment requirements")]
    InvalidChallenge,

    /// The body of the 402 response could not be read.
    #[error("Failed to read 402 response: {0}")]
    ReadChallenge(#[source] reqwest::Error),

    /// None of the offered options is acceptable.
    #[error("No matching payment option: the server no longer offers the selected terms")]
    NoMatchingOption,

    /// The request body is a stream and cannot be replayed.
    #[error("Request object is not cloneable. Are you passing a streaming body?")]
    RequestNotCloneable,

    /// Signing failed.
    #[error(transparent)]
    Signing(#[from] SignerError),

    /// The signed payload is not a valid header value.
    #[error("Signed payment is not a valid header value")]
    InvalidHeader,
}

impl HttpError {
    /// Converts into the agent-facing error for a request to `url`.
    #[must_use]
    pub fn into_action_error(self, url: &str) -> ActionError {
        let url = url.to_owned();
        match self {
            Self::InvalidUrl(_) => ActionError::InvalidUrl { url },
            Self::Transport(e) if e.is_connect() || e.is_timeout() => ActionError::Network {
                url,
                details: e.to_string(),
            },
            Self::Status { status, body } => ActionError::Http {
                url,
                status,
                details: body,
            },
            other => ActionError::Request {
                url,
                details: other.to_string(),
            },
        }
    }
}

/// Maps a middleware client error to the agent-facing error.
pub(crate) fn middleware_error(err: reqwest_middleware::Error, url: &str) -> ActionError {
    match err {
        reqwest_middleware::Error::Reqwest(e) => HttpError::Transport(e).into_action_error(url),
        reqwest_middleware::Error::Middleware(e) => match e.downcast::<PaymentError>() {
            Ok(payment) => ActionError::PaymentRejected(payment.to_string()),
            Err(other) => ActionError::Request {
                url: url.to_owned(),
                details: other.to_string(),
            },
        },
    }
}
