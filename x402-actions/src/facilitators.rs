//! Facilitators that host discovery listings.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ActionError;

/// Facilitator used when the agent does not name one.
pub const DEFAULT_FACILITATOR: &str = "cdp";

/// Facilitators available without configuration.
pub const KNOWN_FACILITATORS: &[(&str, &str)] = &[
    ("cdp", "https://api.cdp.coinbase.com/platform/v2/x402"),
    ("payai", "https://facilitator.payai.network"),
];

/// Whether a facilitator is built in or configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FacilitatorKind {
    /// One of [`KNOWN_FACILITATORS`].
    Known,
    /// Registered through configuration.
    Custom,
}

/// A facilitator as listed to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacilitatorEntry {
    /// Name the agent passes to discovery.
    pub name: String,
    /// Base URL.
    pub url: String,
    /// Known or custom.
    #[serde(rename = "type")]
    pub kind: FacilitatorKind,
}

/// Known facilitators plus the custom ones from configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacilitatorDirectory {
    custom: BTreeMap<String, String>,
}

impl FacilitatorDirectory {
    /// Creates a directory with the given custom facilitators (name to URL).
    #[must_use]
    pub const fn new(custom: BTreeMap<String, String>) -> Self {
        Self { custom }
    }

    /// Resolves a facilitator name to its base URL, without trailing slash.
    ///
    /// Known names take precedence over custom ones.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError::FacilitatorNotAllowed`] listing every accepted
    /// name when `name` is unknown.
    pub fn resolve(&self, name: &str) -> Result<String, ActionError> {
        KNOWN_FACILITATORS
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, url)| (*url).to_owned())
            .or_else(|| self.custom.get(name).cloned())
            .map(|url| url.trim_end_matches('/').to_owned())
            .ok_or_else(|| ActionError::FacilitatorNotAllowed {
                name: name.to_owned(),
                allowed: self.names(),
            })
    }

    /// Every accepted name, known ones first.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        KNOWN_FACILITATORS
            .iter()
            .map(|(name, _)| (*name).to_owned())
            .chain(self.custom.keys().cloned())
            .collect()
    }

    /// All facilitators, known ones first.
    #[must_use]
    pub fn entries(&self) -> Vec<FacilitatorEntry> {
        let known = KNOWN_FACILITATORS.iter().map(|(name, url)| FacilitatorEntry {
            name: (*name).to_owned(),
            url: (*url).to_owned(),
            kind: FacilitatorKind::Known,
        });
        let custom = self.custom.iter().map(|(name, url)| FacilitatorEntry {
            name: name.clone(),
            url: url.clone(),
            kind: FacilitatorKind::Custom,
        });
        known.chain(custom).collect()
    }

    /// Number of custom facilitators.
    #[must_use]
    pub fn custom_count(&self) -> usize {
        self.custom.len()
    }
}
