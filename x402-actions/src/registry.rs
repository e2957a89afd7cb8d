//! Service allow-list.
//!
//! No HTTP request, paid or not, is made to a URL that is not on the list.
//! An entry matches a URL when it equals the URL's origin
//! (`scheme://host[:port]`) or when the URL string starts with it.

use std::collections::BTreeSet;

use url::Url;

/// Errors from registering a service.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The URL could not be parsed or has no scheme or host.
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
}

/// The set of services an agent may call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceRegistry {
    services: BTreeSet<String>,
}

impl ServiceRegistry {
    /// Creates an empty registry. An empty registry allows nothing.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `url` may be requested.
    #[must_use]
    pub fn is_allowed(&self, url: &str) -> bool {
        is_allowed(url, &self.services)
    }

    /// Adds a service after checking it has a scheme and a host.
    ///
    /// The full URL is stored so that it acts as a prefix. Returns the number
    /// of registered services.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::InvalidUrl`] for malformed URLs.
    pub fn register(&mut self, url: &str) -> Result<usize, RegistryError> {
        let parsed = Url::parse(url).map_err(|_| RegistryError::InvalidUrl(url.to_owned()))?;
        if !parsed.has_host() {
            return Err(RegistryError::InvalidUrl(url.to_owned()));
        }
        self.services.insert(url.to_owned());
        Ok(self.services.len())
    }

    /// Registered entries in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(String::as_str)
    }

    /// Number of registered services.
    #[must_use]
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for ServiceRegistry {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            services: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Origin-or-prefix match against a set of registered entries.
///
/// URLs that do not parse are never allowed.
#[must_use]
pub fn is_allowed<'a, I>(url: &str, registered: I) -> bool
where
    I: IntoIterator<Item = &'a String>,
{
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let origin = origin_of(&parsed);
    registered
        .into_iter()
        .any(|entry| !entry.is_empty() && (*entry == origin || url.starts_with(entry.as_str())))
}

/// `scheme://host[:port]`, with the port only when it was written explicitly
/// and is not the scheme default.
fn origin_of(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}://{host}:{port}", url.scheme()),
        None => format!("{}://{host}", url.scheme()),
    }
}
