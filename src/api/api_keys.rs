//! API key management

use crate::client::ApiClient;
use crate::error::{CliError, Result};
use crate::validation::validate_uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const API_KEYS_PATH: &str = "/api/auth/api-keys";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiKeyRequest<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<DateTime<Utc>>,
}

/// An API key; `key` is only returned when the key is generated
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApiKeyResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub name: String,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_used_at: Option<DateTime<Utc>>,
}

/// Generate a new key
///
/// # Errors
///
/// Fails on an empty name, if the server does not return the key, or on
/// any client error.
pub fn generate(
    client: &ApiClient,
    name: &str,
    expires_at: Option<DateTime<Utc>>,
) -> Result<ApiKeyResponse> {
    if name.trim().is_empty() {
        return Err(CliError::MissingArgument("--name".to_string()));
    }

    let response: ApiKeyResponse =
        client.post(API_KEYS_PATH, Some(&ApiKeyRequest { name, expires_at }))?;
    if response.key.as_deref().is_none_or(str::is_empty) {
        return Err(CliError::DeserializationError(
            "API key was not returned by the server".to_string(),
        ));
    }
    Ok(response)
}

/// List keys of the current account
///
/// # Errors
///
/// Returns any client error.
pub fn list(client: &ApiClient) -> Result<Vec<ApiKeyResponse>> {
    client.get(API_KEYS_PATH)
}

/// Fetch one key
///
/// # Errors
///
/// Fails if `id` is not a UUID, or on any client error.
pub fn get(client: &ApiClient, id: &str) -> Result<ApiKeyResponse> {
    validate_uuid(id)?;
    client.get(&format!("{API_KEYS_PATH}/{id}"))
}

/// Revoke a key
///
/// # Errors
///
/// Fails if `id` is not a UUID, or on any client error.
pub fn revoke(client: &ApiClient, id: &str) -> Result<()> {
    validate_uuid(id)?;
    client.delete(&format!("{API_KEYS_PATH}/{id}"))
}
