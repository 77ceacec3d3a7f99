//! Download target resolution
//!
//! Works out what a downloaded file should be called and where it lands:
//! the server's `Content-Disposition` header first, then the request path,
//! then a fixed fallback name. Every candidate is reduced to a bare basename
//! so a hostile header cannot escape the chosen directory.

use crate::error::{CliError, Result};
use log::{info, warn};
use regex::Regex;
use reqwest::blocking::Response;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Name used when nothing better is available
pub const FALLBACK_FILENAME: &str = "download";

#[allow(clippy::expect_used)] // literal pattern
static FILENAME_PARAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"filename(\*)?=(?:"([^"]+)"|([^;]+))"#).expect("filename pattern compiles")
});

/// Extract the `filename` (or `filename*`) parameter of a
/// `Content-Disposition` header value.
///
/// Handles `filename="a b.txt"`, `filename=a.txt` and RFC 5987
/// `filename*=UTF-8''a%20b.txt` forms. The first parameter wins.
#[must_use]
pub fn filename_from_content_disposition(header: &str) -> Option<String> {
    let captures = FILENAME_PARAM.captures(header)?;
    let extended = captures.get(1).is_some();
    let value = captures
        .get(2)
        .or_else(|| captures.get(3))
        .map(|m| m.as_str().trim().trim_matches('"'))
        .filter(|value| !value.is_empty())?;

    if extended {
        return Some(decode_ext_value(value));
    }
    Some(value.to_string())
}

/// Decode an RFC 5987 `charset'lang'value` string; anything that does not
/// look like one is returned unchanged.
fn decode_ext_value(value: &str) -> String {
    let Some((_, encoded)) = value.split_once("''") else {
        return value.to_string();
    };
    urlencoding::decode(encoded).map_or_else(|_| value.to_string(), |decoded| decoded.into_owned())
}

/// Reduce a server-supplied name to a safe basename.
///
/// Everything up to the last `/` or `\` is dropped and any remaining `..`
/// is replaced with `_`; an empty or `.` result becomes
/// [`FALLBACK_FILENAME`].
#[must_use]
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned = base.replace("..", "_");

    if cleaned.is_empty() || cleaned == "." {
        FALLBACK_FILENAME.to_string()
    } else {
        cleaned
    }
}

/// Fallback name taken from the request path: its last non-empty segment,
/// ignoring any query string.
#[must_use]
pub fn filename_from_request_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.rsplit('/')
        .find(|segment| !segment.is_empty())
        .filter(|segment| *segment != FALLBACK_FILENAME)
        .map_or_else(|| FALLBACK_FILENAME.to_string(), sanitize_filename)
}

/// Filename for a download response, in priority order: header, request
/// path, fallback.
#[must_use]
pub fn resolve_filename(content_disposition: Option<&str>, request_path: &str) -> String {
    content_disposition
        .and_then(filename_from_content_disposition)
        .map_or_else(
            || filename_from_request_path(request_path),
            |name| sanitize_filename(&name),
        )
}

/// Decide where the downloaded file is written.
///
/// * an existing directory receives the file under `filename`;
/// * any other non-empty path is used as-is, creating parent directories;
/// * an empty path saves `filename` in the current directory.
///
/// # Errors
///
/// Returns [`CliError::DirError`] if a parent directory cannot be created.
pub fn resolve_destination(output: &Path, filename: &str) -> Result<PathBuf> {
    if output.is_dir() {
        return Ok(output.join(filename));
    }

    if output.as_os_str().is_empty() {
        return Ok(PathBuf::from(filename));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| CliError::DirError {
            path: parent.to_path_buf(),
            reason: format!("failed to create output directory: {e}"),
        })?;
    }
    Ok(output.to_path_buf())
}

/// Stream a response body into `destination`.
///
/// The partially written file is removed if copying fails.
pub(crate) fn write_body(mut response: Response, destination: &Path) -> Result<u64> {
    let mut file = File::create(destination).map_err(|e| CliError::FileError {
        path: destination.to_path_buf(),
        reason: format!("failed to create output file: {e}"),
    })?;

    let written = response
        .copy_to(&mut file)
        .map_err(|e| e.to_string())
        .and_then(|bytes| file.sync_all().map(|()| bytes).map_err(|e| e.to_string()));

    match written {
        Ok(bytes) => {
            info!("Saved {bytes} bytes to {}", destination.display());
            Ok(bytes)
        }
        Err(reason) => {
            drop(file);
            if let Err(e) = fs::remove_file(destination) {
                warn!(
                    "Failed to remove partial download {}: {e}",
                    destination.display()
                );
            }
            Err(CliError::FileError {
                path: destination.to_path_buf(),
                reason: format!("failed to write file: {reason}"),
            })
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_disposition_quoted() {
        assert_eq!(
            filename_from_content_disposition(r#"attachment; filename="report 2024.pdf""#),
            Some("report 2024.pdf".to_string())
        );
    }

    #[test]
    fn test_content_disposition_unquoted() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename=report.pdf; size=10"),
            Some("report.pdf".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename= spaced.txt "),
            Some("spaced.txt".to_string())
        );
    }

    #[test]
    fn test_content_disposition_extended() {
        assert_eq!(
            filename_from_content_disposition("attachment; filename*=UTF-8''na%C3%AFve%20file.txt"),
            Some("naïve file.txt".to_string())
        );
        assert_eq!(
            filename_from_content_disposition("attachment; filename*=plain.txt"),
            Some("plain.txt".to_string())
        );
    }

    #[test]
    fn test_content_disposition_missing() {
        assert_eq!(filename_from_content_disposition(""), None);
        assert_eq!(filename_from_content_disposition("inline"), None);
        assert_eq!(filename_from_content_disposition(r#"attachment; filename="""#), None);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("dir/file.txt"), "file.txt");
        assert_eq!(sanitize_filename("dir\\file.txt"), "file.txt");
        assert_eq!(sanitize_filename("dir/"), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("a..b"), "a_b");
        assert_eq!(sanitize_filename("..."), "_.");
        assert_eq!(sanitize_filename(""), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename("."), FALLBACK_FILENAME);
        assert_eq!(sanitize_filename(".."), "_");
    }

    #[test]
    fn test_traversal_header_resolves_to_basename() {
        let name = resolve_filename(
            Some(r#"attachment; filename="../../etc/passwd""#),
            "/api/files/123/download",
        );
        assert_eq!(name, "passwd");
        assert!(!name.contains('/'));
    }

    #[test]
    fn test_filename_from_request_path() {
        assert_eq!(filename_from_request_path("/api/files/abc"), "abc");
        assert_eq!(filename_from_request_path("/api/files/abc/"), "abc");
        assert_eq!(filename_from_request_path("/api/files/abc/download"), FALLBACK_FILENAME);
        assert_eq!(
            filename_from_request_path("/api/files/download-by-path?filepath=%2Fa.txt"),
            "download-by-path"
        );
        assert_eq!(filename_from_request_path("/"), FALLBACK_FILENAME);
        assert_eq!(filename_from_request_path(""), FALLBACK_FILENAME);
    }

    #[test]
    fn test_header_wins_over_path() {
        assert_eq!(
            resolve_filename(Some("attachment; filename=a.txt"), "/api/files/b.txt"),
            "a.txt"
        );
        assert_eq!(resolve_filename(None, "/api/files/b.txt"), "b.txt");
        assert_eq!(resolve_filename(Some("inline"), "/x/download"), FALLBACK_FILENAME);
    }

    #[test]
    fn test_destination_directory() {
        let dir = TempDir::new().unwrap();
        let destination = resolve_destination(dir.path(), "a.txt").unwrap();
        assert_eq!(destination, dir.path().join("a.txt"));
    }

    #[test]
    fn test_destination_explicit_file_creates_parents() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("nested/deeper/out.bin");
        let destination = resolve_destination(&output, "ignored.txt").unwrap();
        assert_eq!(destination, output);
        assert!(dir.path().join("nested/deeper").is_dir());
    }

    #[test]
    fn test_destination_empty_uses_filename() {
        let destination = resolve_destination(Path::new(""), "a.txt").unwrap();
        assert_eq!(destination, PathBuf::from("a.txt"));
    }
}
