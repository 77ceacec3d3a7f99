//! Folder endpoints

use super::with_query;
use crate::client::ApiClient;
use crate::error::Result;
use crate::validation::validate_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A virtual folder
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderResponse {
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub file_count: i64,
    pub created_at: Option<DateTime<Utc>>,
}

/// Usage figures for one folder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FolderStatisticsResponse {
    pub path: String,
    pub total_files: i64,
    pub storage_used: String,
    pub average_file_size: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub by_content_type: BTreeMap<String, i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize)]
struct FolderCreateRequest<'a> {
    path: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// Create a folder
///
/// # Errors
///
/// Fails on an invalid path, or on any client error.
pub fn create(client: &ApiClient, path: &str, description: Option<&str>) -> Result<FolderResponse> {
    validate_path(path)?;

    let request = FolderCreateRequest {
        path,
        description: description.filter(|d| !d.is_empty()),
    };
    client.post("/api/folders", Some(&request))
}

/// List folders, optionally only those under `parent_path`
///
/// # Errors
///
/// Fails on an invalid parent path, or on any client error.
pub fn list(client: &ApiClient, parent_path: Option<&str>) -> Result<Vec<FolderResponse>> {
    let parent_path = parent_path.unwrap_or_default();
    if !parent_path.is_empty() {
        validate_path(parent_path)?;
    }
    client.get(&with_query("/api/folders", &[("parentPath", parent_path)]))
}

/// Delete an empty folder
///
/// # Errors
///
/// Fails on an invalid path, or on any client error.
pub fn delete(client: &ApiClient, path: &str) -> Result<()> {
    validate_path(path)?;
    client.delete(&with_query("/api/folders", &[("path", path)]))
}

/// Usage figures for `path`
///
/// # Errors
///
/// Fails on an invalid path, or on any client error.
pub fn statistics(client: &ApiClient, path: &str) -> Result<FolderStatisticsResponse> {
    validate_path(path)?;
    client.get(&with_query("/api/folders/statistics", &[("path", path)]))
}
