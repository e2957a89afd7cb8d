//! Request descriptions and response decoding.

use std::collections::BTreeMap;
use std::fmt::{self, Display, Formatter};

use http::header::CONTENT_TYPE;
use http::{HeaderMap, Method};
use reqwest_middleware::ClientWithMiddleware;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::HttpError;

/// HTTP verbs the actions may use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// `GET`
    #[default]
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `PATCH`
    Patch,
}

impl HttpMethod {
    /// Whether a JSON body is sent with this verb.
    #[must_use]
    pub const fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put | Self::Patch)
    }

    /// Verb to retry with after a 404, for verbs that carry no body.
    ///
    /// Many endpoints answer 404 rather than 405 to the wrong verb.
    #[must_use]
    pub const fn not_found_fallback(self) -> Option<Self> {
        match self {
            Self::Get => Some(Self::Post),
            Self::Delete => Some(Self::Get),
            Self::Post | Self::Put | Self::Patch => None,
        }
    }

    /// Upper-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }
}

impl Display for HttpMethod {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<HttpMethod> for Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => Self::GET,
            HttpMethod::Post => Self::POST,
            HttpMethod::Put => Self::PUT,
            HttpMethod::Delete => Self::DELETE,
            HttpMethod::Patch => Self::PATCH,
        }
    }
}

/// A request an agent asked for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpRequestSpec {
    /// Target URL.
    pub url: String,
    /// Verb.
    #[serde(default)]
    pub method: HttpMethod,
    /// Extra request headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    /// Query parameters appended to the URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<BTreeMap<String, String>>,
    /// JSON body, sent for POST, PUT and PATCH only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl HttpRequestSpec {
    /// A GET request for `url`.
    pub fn get<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            method: HttpMethod::Get,
            headers: None,
            query_params: None,
            body: None,
        }
    }

    /// The URL with query parameters appended.
    ///
    /// Parameters extend an existing query string rather than replacing it.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `url` does not parse.
    pub fn build_url(&self) -> Result<Url, HttpError> {
        let mut url = Url::parse(&self.url)?;
        if let Some(params) = self.query_params.as_ref().filter(|p| !p.is_empty()) {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    /// Sends the request with `method` in place of the described one.
    pub(crate) async fn send_as(
        &self,
        client: &ClientWithMiddleware,
        url: Url,
        method: HttpMethod,
    ) -> reqwest_middleware::Result<reqwest::Response> {
        let mut builder = client.request(method.into(), url);
        for (name, value) in self.headers.iter().flatten() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if method.has_body()
            && let Some(body) = &self.body
        {
            let bytes = serde_json::to_vec(body).map_err(|e| reqwest_middleware::Error::Middleware(e.into()))?;
            builder = builder.header(CONTENT_TYPE, "application/json").body(bytes);
        }
        builder.send().await
    }
}

/// A completed HTTP exchange.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpOutcome {
    /// Final URL, query included.
    pub url: String,
    /// Verb actually used.
    pub method: HttpMethod,
    /// Response status.
    pub status: u16,
    /// Response body: JSON when declared and parseable, text otherwise.
    pub data: Value,
    /// Decoded settlement proof, if any.
    pub payment_proof: Option<Value>,
}

impl HttpOutcome {
    /// Whether the server accepted the request.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Decodes a response body.
///
/// JSON is returned only when the content type says so and the body parses;
/// anything else is returned as a string.
#[must_use]
pub fn parse_response_data(headers: &HeaderMap, body: &[u8]) -> Value {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"));
    if is_json && let Ok(value) = serde_json::from_slice(body) {
        return value;
    }
    Value::String(String::from_utf8_lossy(body).into_owned())
}
