//! Credentials and the immutable client configuration

use reqwest::blocking::RequestBuilder;
use std::fmt;
use std::time::Duration;

/// Header carrying an API key
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Header carrying a bearer token
pub const AUTHORIZATION_HEADER: &str = "Authorization";

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Credential attached to every request
#[derive(Clone, Default, PartialEq, Eq)]
pub enum Credential {
    /// API key, sent as `X-API-Key`
    ApiKey(String),
    /// Access token, sent as `Authorization: Bearer <token>`
    Bearer(String),
    /// No credential; the server is expected to reject protected calls
    #[default]
    Anonymous,
}

impl Credential {
    /// Resolve the active credential from optional stored values.
    ///
    /// An API key wins over an access token when both are present, matching
    /// how the API itself authenticates. Empty strings count as absent.
    #[must_use]
    pub fn from_parts(api_key: Option<&str>, access_token: Option<&str>) -> Self {
        let api_key = api_key.filter(|key| !key.is_empty());
        let access_token = access_token.filter(|token| !token.is_empty());

        match (api_key, access_token) {
            (Some(key), _) => Self::ApiKey(key.to_string()),
            (None, Some(token)) => Self::Bearer(token.to_string()),
            (None, None) => Self::Anonymous,
        }
    }

    /// Header name and value for this credential, if any
    #[must_use]
    pub fn header(&self) -> Option<(&'static str, String)> {
        match self {
            Self::ApiKey(key) => Some((API_KEY_HEADER, key.clone())),
            Self::Bearer(token) => Some((AUTHORIZATION_HEADER, format!("Bearer {token}"))),
            Self::Anonymous => None,
        }
    }

    /// Whether any credential is configured
    #[must_use]
    pub const fn is_present(&self) -> bool {
        !matches!(self, Self::Anonymous)
    }

    pub(crate) fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.header() {
            Some((name, value)) => request.header(name, value),
            None => request,
        }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.write_str("ApiKey(***)"),
            Self::Bearer(_) => f.write_str("Bearer(***)"),
            Self::Anonymous => f.write_str("Anonymous"),
        }
    }
}

/// Resolved connection settings for one CLI invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    base_url: String,
    credential: Credential,
    timeout: Duration,
}

impl ClientConfig {
    /// Create a configuration with the default 30 second timeout
    pub fn new(base_url: impl Into<String>, credential: Credential) -> Self {
        Self {
            base_url: base_url.into(),
            credential,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replace the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// API base URL as configured
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Active credential
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// Per-request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }
}
