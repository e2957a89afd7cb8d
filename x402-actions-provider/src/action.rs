//! The action provider seam.
//!
//! An agent framework lists the [`ActionDefinition`]s of every provider,
//! hands them to the model as tools and routes tool calls back through
//! [`ActionProvider::invoke`]. Results are JSON text, refusals included, so
//! the model always gets something it can read.

use serde::Serialize;
use serde_json::Value;
use x402_actions::chain::Network;
use x402_actions::wallet::WalletProvider;

/// A tool as presented to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionDefinition {
    /// Tool name.
    pub name: &'static str,
    /// Instructions for the model.
    pub description: &'static str,
    /// JSON schema of the arguments.
    pub schema: Value,
}

/// Errors that prevent an action from producing a result at all.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// No action has this name.
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    /// The HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// A set of actions sharing configuration.
#[async_trait::async_trait]
pub trait ActionProvider: Send + Sync {
    /// Provider name.
    fn name(&self) -> &'static str;

    /// Every action this provider offers.
    fn actions(&self) -> Vec<ActionDefinition>;

    /// Whether the provider works with a wallet on `network`.
    fn supports_network(&self, network: &Network) -> bool;

    /// Runs `action` with JSON `args`, returning pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::UnknownAction`] for names not in
    /// [`ActionProvider::actions`]. Failures of a known action are rendered
    /// into the returned JSON instead.
    async fn invoke(
        &mut self,
        wallet: &dyn WalletProvider,
        action: &str,
        args: Value,
    ) -> Result<String, ProviderError>;
}
