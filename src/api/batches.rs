//! Batch job status

use crate::client::ApiClient;
use crate::error::Result;
use crate::validation::validate_uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Progress of a background batch job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BatchJobResponse {
    pub batch_id: String,
    pub job_type: String,
    pub status: String,
    pub progress: i64,
    pub total_items: i64,
    pub processed_items: i64,
    pub failed_items: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_completion: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_message: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Fetch the status of batch job `id`
///
/// # Errors
///
/// Fails if `id` is not a UUID, or on any client error.
pub fn status(client: &ApiClient, id: &str) -> Result<BatchJobResponse> {
    validate_uuid(id)?;
    client.get(&format!("/api/batches/{id}/status"))
}
