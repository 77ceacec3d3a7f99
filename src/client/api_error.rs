//! Structured error for failed API responses
//!
//! Any response with a status of 400 or above is turned into an [`ApiError`]
//! carrying the status code, the request method and URL, and whatever
//! `message`/`details` the server put in its JSON body.

use reqwest::blocking::Response;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Error response from the storage API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// HTTP status code of the response
    pub status_code: u16,
    /// Server supplied message, or the raw body for non-JSON responses
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    /// Optional server supplied details
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub details: String,
    /// HTTP method of the failed request
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    /// Fully resolved URL of the failed request
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub url: String,
}

impl ApiError {
    /// Create an error with a status code and message
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Attach details to the error
    #[must_use]
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = details.into();
        self
    }

    /// Attach the request method and URL to the error
    #[must_use]
    pub fn with_request(mut self, method: impl Into<String>, url: impl Into<String>) -> Self {
        self.method = method.into();
        self.url = url.into();
        self
    }

    /// Build an error from a raw failure body.
    ///
    /// A JSON object body contributes its `message` and `details` string
    /// fields. Anything else is used verbatim as the message, and an empty
    /// body falls back to the status line (`404 Not Found`).
    #[must_use]
    pub fn from_body(status: StatusCode, body: &[u8], method: &str, url: &str) -> Self {
        let parsed = match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(fields)) => {
                let text = |key: &str| {
                    fields
                        .get(key)
                        .and_then(Value::as_str)
                        .unwrap_or_default()
                        .to_string()
                };
                Some(Self::new(status.as_u16(), text("message")).with_details(text("details")))
            }
            _ => None,
        };

        parsed
            .unwrap_or_else(|| {
                let raw = String::from_utf8_lossy(body);
                let message = if raw.is_empty() {
                    status_line(status)
                } else {
                    raw.into_owned()
                };
                Self::new(status.as_u16(), message)
            })
            .with_request(method, url)
    }

    /// Read a failed response to the end and normalize it.
    pub(crate) fn from_response(response: Response, method: &str, url: &str) -> Self {
        let status = response.status();
        match response.bytes() {
            Ok(body) => Self::from_body(status, &body, method, url),
            Err(_) => Self::new(status.as_u16(), "Failed to read error response")
                .with_request(method, url),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API error ({})", self.status_code)?;
        if !self.method.is_empty() && !self.url.is_empty() {
            write!(f, " [{} {}]", self.method, self.url)?;
        }
        if self.message.is_empty() && self.details.is_empty() {
            return Ok(());
        }
        write!(f, ": {}", self.message)?;
        if !self.details.is_empty() {
            write!(f, " - {}", self.details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {reason}", status.as_u16()),
        None => status.as_u16().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://host/api/files/123";

    #[test]
    fn json_message_is_rendered_with_request_context() {
        let err = ApiError::from_body(
            StatusCode::NOT_FOUND,
            br#"{"message":"File not found"}"#,
            "GET",
            URL,
        );
        assert_eq!(err.status_code, 404);
        assert_eq!(err.message, "File not found");
        assert_eq!(
            err.to_string(),
            "API error (404) [GET http://host/api/files/123]: File not found"
        );
    }

    #[test]
    fn details_are_appended() {
        let err = ApiError::from_body(
            StatusCode::BAD_REQUEST,
            br#"{"message":"Validation failed","details":"folderPath must start with /"}"#,
            "POST",
            "http://host/api/folders",
        );
        assert_eq!(
            err.to_string(),
            "API error (400) [POST http://host/api/folders]: Validation failed - folderPath must start with /"
        );
    }

    #[test]
    fn body_status_code_is_overridden_by_real_status() {
        let err = ApiError::from_body(
            StatusCode::CONFLICT,
            br#"{"statusCode":200,"message":"exists","method":"PUT","url":"elsewhere"}"#,
            "POST",
            URL,
        );
        assert_eq!(err.status_code, 409);
        assert_eq!(err.method, "POST");
        assert_eq!(err.url, URL);
    }

    #[test]
    fn plain_text_body_becomes_message() {
        let err = ApiError::from_body(
            StatusCode::BAD_GATEWAY,
            b"upstream unavailable",
            "GET",
            URL,
        );
        assert_eq!(err.message, "upstream unavailable");
        assert!(err.details.is_empty());
    }

    #[test]
    fn empty_body_falls_back_to_status_line() {
        let err = ApiError::from_body(StatusCode::INTERNAL_SERVER_ERROR, b"", "DELETE", URL);
        assert_eq!(err.message, "500 Internal Server Error");
        assert_eq!(
            err.to_string(),
            "API error (500) [DELETE http://host/api/files/123]: 500 Internal Server Error"
        );
    }

    #[test]
    fn non_object_json_is_treated_as_text() {
        let err = ApiError::from_body(StatusCode::BAD_REQUEST, b"[1,2]", "GET", URL);
        assert_eq!(err.message, "[1,2]");
    }

    #[test]
    fn empty_object_renders_base_only() {
        let err = ApiError::from_body(StatusCode::FORBIDDEN, b"{}", "GET", URL);
        assert_eq!(err.to_string(), "API error (403) [GET http://host/api/files/123]");
    }

    #[test]
    fn request_context_is_optional_in_rendering() {
        let err = ApiError::new(401, "Unauthorized");
        assert_eq!(err.to_string(), "API error (401): Unauthorized");
    }
}
