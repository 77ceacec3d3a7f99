//! Stored credentials

use super::mask_value;
use crate::client::Credential;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Credentials persisted in the `[auth]` table
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Short-lived access token from `auth login`
    #[serde(default)]
    pub access_token: String,

    /// Refresh token used to obtain new access tokens
    #[serde(default)]
    pub refresh_token: String,

    /// Long-lived API key; preferred over the access token when set
    #[serde(default)]
    pub api_key: String,
}

impl AuthConfig {
    /// Check if any credential is configured
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.access_token.is_empty() || !self.api_key.is_empty()
    }

    /// Credential to attach to requests
    #[must_use]
    pub fn credential(&self) -> Credential {
        Credential::from_parts(Some(&self.api_key), Some(&self.access_token))
    }

    /// Drop the session tokens. The API key is left alone.
    pub fn clear_tokens(&mut self) {
        self.access_token.clear();
        self.refresh_token.clear();
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("access_token", &mask_value(&self.access_token))
            .field("refresh_token", &mask_value(&self.refresh_token))
            .field("api_key", &mask_value(&self.api_key))
            .finish()
    }
}
