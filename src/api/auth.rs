//! Account and session endpoints

use crate::client::ApiClient;
use crate::error::{CliError, Result};
use crate::validation::{validate_email, validate_username};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client type reported on login so the server issues CLI-lifetime tokens
pub const CLIENT_TYPE: &str = "CLI";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
    client_type: &'a str,
}

#[derive(Debug, Serialize)]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

/// Account details
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub active: bool,
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Tokens issued by a successful login
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub refresh_expires_in: i64,
    pub client_type: String,
    pub user: UserResponse,
}

/// New access token from a refresh
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RefreshTokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn require_password(password: &str) -> Result<()> {
    if password.is_empty() {
        return Err(CliError::InvalidArgument("password cannot be empty".to_string()));
    }
    Ok(())
}

/// Log in with username and password
///
/// # Errors
///
/// Fails on an invalid username, an empty password, or any client error.
pub fn login(client: &ApiClient, username: &str, password: &str) -> Result<AuthResponse> {
    validate_username(username)?;
    require_password(password)?;

    let request = LoginRequest {
        username,
        password,
        client_type: CLIENT_TYPE,
    };
    client.post("/api/auth/login", Some(&request))
}

/// Create a new account
///
/// # Errors
///
/// Fails on an invalid username or email, an empty password, or any client
/// error.
pub fn register(
    client: &ApiClient,
    username: &str,
    email: &str,
    password: &str,
) -> Result<UserResponse> {
    validate_username(username)?;
    validate_email(email)?;
    require_password(password)?;

    let request = RegisterRequest {
        username,
        email,
        password,
    };
    client.post("/api/auth/register", Some(&request))
}

/// Exchange a refresh token for a new access token
///
/// # Errors
///
/// Returns [`CliError::NotAuthenticated`] when no refresh token is stored.
pub fn refresh(client: &ApiClient, refresh_token: &str) -> Result<RefreshTokenResponse> {
    if refresh_token.is_empty() {
        return Err(CliError::NotAuthenticated(
            "no refresh token found, run 'auth login' first".to_string(),
        ));
    }
    client.post("/api/auth/refresh", Some(&RefreshTokenRequest { refresh_token }))
}

/// Revoke a refresh token on the server
///
/// # Errors
///
/// Returns any client error.
pub fn logout(client: &ApiClient, refresh_token: &str) -> Result<()> {
    client.post_discard("/api/auth/logout", Some(&RefreshTokenRequest { refresh_token }))
}

/// Fetch the authenticated account
///
/// # Errors
///
/// Returns any client error.
pub fn me(client: &ApiClient) -> Result<UserResponse> {
    client.get("/api/auth/me")
}
