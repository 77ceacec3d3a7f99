//! Typed wrappers around the storage API endpoints
//!
//! Each function validates its inputs before any request is made, then
//! delegates to [`ApiClient`](crate::client::ApiClient).

pub mod api_keys;
pub mod auth;
pub mod batches;
pub mod files;
pub mod folders;

/// Append percent-encoded query parameters to `path`.
///
/// Parameters with empty values are skipped.
pub(crate) fn with_query(path: &str, params: &[(&str, &str)]) -> String {
    let params: Vec<String> = params
        .iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("{key}={}", urlencoding::encode(value)))
        .collect();

    if params.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{}", params.join("&"))
    }
}
