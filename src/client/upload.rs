//! Multipart form construction for file uploads

use crate::error::{CliError, Result};
use reqwest::blocking::multipart::{Form, Part};
use std::fs;
use std::path::Path;

/// Form field carrying the file bytes
pub const FILE_FIELD: &str = "file";
/// Optional form field with the destination folder
pub const FOLDER_PATH_FIELD: &str = "folderPath";
/// Optional form field overriding the stored filename
pub const FILENAME_FIELD: &str = "filename";

const OCTET_STREAM: &str = "application/octet-stream";

/// Build the upload form for `local_file`.
///
/// The file is read into memory so every part has a known length; reqwest
/// then sends the body with an explicit `Content-Length` instead of chunked
/// encoding. The part always carries the local basename; `filename` is only
/// an override hint for the server and is sent when non-empty, as is
/// `folder_path`.
///
/// # Errors
///
/// Returns [`CliError::FileError`] if the file cannot be read or has no
/// file name component.
pub fn build_form(
    local_file: &Path,
    folder_path: Option<&str>,
    filename: Option<&str>,
) -> Result<Form> {
    let basename = local_file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::FileError {
            path: local_file.to_path_buf(),
            reason: "path has no file name".to_string(),
        })?;

    let bytes = fs::read(local_file).map_err(|e| CliError::FileError {
        path: local_file.to_path_buf(),
        reason: format!("failed to open file: {e}"),
    })?;

    let part = Part::bytes(bytes)
        .file_name(basename)
        .mime_str(OCTET_STREAM)
        .map_err(|e| CliError::SerializationError(e.to_string()))?;

    let mut form = Form::new().part(FILE_FIELD, part);
    if let Some(folder_path) = folder_path.filter(|value| !value.is_empty()) {
        form = form.text(FOLDER_PATH_FIELD, folder_path.to_string());
    }
    if let Some(filename) = filename.filter(|value| !value.is_empty()) {
        form = form.text(FILENAME_FIELD, filename.to_string());
    }

    Ok(form)
}
