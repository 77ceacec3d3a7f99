//! File endpoints: upload, listing, search, download, metadata updates

use super::with_query;
use crate::client::ApiClient;
use crate::error::{CliError, Result};
use crate::validation::{
    validate_filename, validate_page_number, validate_page_size, validate_path, validate_uuid,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Stored file metadata
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileResponse {
    pub id: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder_path: Option<String>,
    pub cloudinary_url: String,
    pub cloudinary_secure_url: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Paging details of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Pageable {
    pub page_number: i64,
    pub page_size: i64,
}

/// One page of files
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageResponse {
    pub content: Vec<FileResponse>,
    pub pageable: Pageable,
    pub total_elements: i64,
    pub total_pages: i64,
    pub number_of_elements: i64,
    pub first: bool,
    pub last: bool,
}

/// Storage usage summary
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FileStatisticsResponse {
    pub total_files: i64,
    pub storage_used: String,
    pub average_file_size: i64,
    pub by_content_type: BTreeMap<String, i64>,
    pub by_folder: BTreeMap<String, i64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Filters shared by listing and search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: i64,
    pub size: i64,
    pub sort: Option<String>,
    pub content_type: Option<String>,
    pub folder_path: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
            content_type: None,
            folder_path: None,
        }
    }
}

impl ListQuery {
    fn validate(&self) -> Result<()> {
        validate_page_number(self.page)?;
        validate_page_size(self.size)?;
        if let Some(folder_path) = non_empty(self.folder_path.as_deref()) {
            validate_path(folder_path)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FileUpdateRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    filename: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    folder_path: Option<&'a str>,
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.is_empty())
}

/// Upload a local file
///
/// # Errors
///
/// Fails if the folder path or filename override is invalid, if
/// `local_file` is missing or a directory, or on any client error.
pub fn upload(
    client: &ApiClient,
    local_file: &Path,
    folder_path: Option<&str>,
    filename: Option<&str>,
) -> Result<FileResponse> {
    let folder_path = non_empty(folder_path);
    let filename = non_empty(filename);

    if let Some(folder_path) = folder_path {
        validate_path(folder_path)?;
    }
    if let Some(filename) = filename {
        validate_filename(filename)?;
    }

    let metadata = std::fs::metadata(local_file).map_err(|e| CliError::FileError {
        path: local_file.to_path_buf(),
        reason: if e.kind() == std::io::ErrorKind::NotFound {
            "file not found".to_string()
        } else {
            format!("failed to access file: {e}")
        },
    })?;
    if metadata.is_dir() {
        return Err(CliError::FileError {
            path: local_file.to_path_buf(),
            reason: "path is a directory, not a file".to_string(),
        });
    }

    client.upload_file("/api/files/upload", local_file, folder_path, filename)
}

/// List files page by page
///
/// # Errors
///
/// Fails on invalid pagination or folder path, or on any client error.
pub fn list(client: &ApiClient, query: &ListQuery) -> Result<PageResponse> {
    query.validate()?;

    let page = query.page.to_string();
    let size = query.size.to_string();
    let path = with_query(
        "/api/files",
        &[
            ("page", page.as_str()),
            ("size", size.as_str()),
            ("sort", query.sort.as_deref().unwrap_or_default()),
            ("contentType", query.content_type.as_deref().unwrap_or_default()),
            ("folderPath", query.folder_path.as_deref().unwrap_or_default()),
        ],
    );
    client.get(&path)
}

/// Search files whose name contains `term`
///
/// `query.sort` is not used by the search endpoint.
///
/// # Errors
///
/// Fails on a blank search term, invalid pagination or folder path, or on
/// any client error.
pub fn search(client: &ApiClient, term: &str, query: &ListQuery) -> Result<PageResponse> {
    if term.trim().is_empty() {
        return Err(CliError::InvalidArgument("search query cannot be empty".to_string()));
    }
    query.validate()?;

    let page = query.page.to_string();
    let size = query.size.to_string();
    let path = with_query(
        "/api/files/search",
        &[
            ("q", term),
            ("page", page.as_str()),
            ("size", size.as_str()),
            ("contentType", query.content_type.as_deref().unwrap_or_default()),
            ("folderPath", query.folder_path.as_deref().unwrap_or_default()),
        ],
    );
    client.get(&path)
}

/// Storage usage across all files
///
/// # Errors
///
/// Returns any client error.
pub fn statistics(client: &ApiClient) -> Result<FileStatisticsResponse> {
    client.get("/api/files/statistics")
}

/// Request path for downloading `identifier`, a file ID or a full path.
///
/// # Errors
///
/// Fails if `identifier` is neither a valid UUID nor a valid path or
/// filename.
pub fn download_path(identifier: &str) -> Result<String> {
    if validate_uuid(identifier).is_ok() {
        return Ok(format!("/api/files/{identifier}/download"));
    }

    if identifier.starts_with('/') {
        validate_path(identifier)?;
    } else {
        validate_filename(identifier)?;
    }
    Ok(format!(
        "/api/files/download-by-path?filepath={}",
        urlencoding::encode(identifier)
    ))
}

/// Download a file by ID or path and return where it was saved
///
/// # Errors
///
/// See [`download_path`] and [`ApiClient::download_file`].
pub fn download(client: &ApiClient, identifier: &str, output: &Path) -> Result<PathBuf> {
    let path = download_path(identifier)?;
    client.download_file(&path, output)
}

/// Rename a file or move it to another folder
///
/// # Errors
///
/// Fails if `id` is not a UUID, if neither field is given, if a field is
/// invalid, or on any client error.
pub fn update(
    client: &ApiClient,
    id: &str,
    filename: Option<&str>,
    folder_path: Option<&str>,
) -> Result<FileResponse> {
    validate_uuid(id)?;

    let filename = non_empty(filename);
    let folder_path = non_empty(folder_path);
    if filename.is_none() && folder_path.is_none() {
        return Err(CliError::MissingArgument(
            "at least one of --filename or --folder-path".to_string(),
        ));
    }
    if let Some(filename) = filename {
        validate_filename(filename)?;
    }
    if let Some(folder_path) = folder_path {
        validate_path(folder_path)?;
    }

    let request = FileUpdateRequest {
        filename,
        folder_path,
    };
    client.put(&format!("/api/files/{id}"), &request)
}

/// Delete a file
///
/// # Errors
///
/// Fails if `id` is not a UUID, or on any client error.
pub fn delete(client: &ApiClient, id: &str) -> Result<()> {
    validate_uuid(id)?;
    client.delete(&format!("/api/files/{id}"))
}
