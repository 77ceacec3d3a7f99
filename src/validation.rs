//! Input validation for user-facing identifiers
//!
//! Every identifier that ends up in a request path, query string or form
//! field goes through one of these checks before a request is built. The
//! functions are pure: no I/O, no shared state, same verdict for the same
//! input.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use uuid::Uuid;

/// Canonical 8-4-4-4-12 hexadecimal UUID layout
#[allow(clippy::expect_used)] // literal pattern
static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .expect("UUID pattern compiles")
});

#[allow(clippy::expect_used)] // literal pattern
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern compiles")
});

/// Legacy device names that cannot be used as filenames on Windows
pub const RESERVED_FILENAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Minimum username length in characters
pub const USERNAME_MIN_LEN: usize = 3;

/// Maximum username length in characters
pub const USERNAME_MAX_LEN: usize = 50;

/// Largest page size the API accepts
pub const MAX_PAGE_SIZE: i64 = 100;

/// Reasons an input value is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty UUID
    #[error("UUID cannot be empty")]
    EmptyUuid,
    /// Not in 8-4-4-4-12 hexadecimal layout
    #[error("invalid UUID format: {0} (expected format: xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx)")]
    UuidFormat(String),
    /// Rejected by the UUID parser
    #[error("invalid UUID: {0}")]
    UuidParse(String),

    /// Empty path
    #[error("path cannot be empty")]
    EmptyPath,
    /// Path without a leading `/`
    #[error("path must start with '/'")]
    PathNotAbsolute,
    /// Path containing `..`
    #[error("path cannot contain '..'")]
    PathTraversal,
    /// Path containing a backslash
    #[error("path must use forward slashes, not backslashes")]
    PathBackslash,
    /// Path containing a NUL byte
    #[error("path cannot contain null bytes")]
    PathNullByte,
    /// Path containing a control character
    #[error("path cannot contain control characters")]
    PathControlChar,

    /// Empty filename
    #[error("filename cannot be empty")]
    EmptyFilename,
    /// Filename containing a path separator
    #[error("filename cannot contain path separators")]
    FilenameSeparator,
    /// Filename that is `.` or `..`
    #[error("filename cannot be '.' or '..'")]
    FilenameDots,
    /// Filename containing a NUL byte
    #[error("filename cannot contain null bytes")]
    FilenameNullByte,
    /// Filename containing a control character
    #[error("filename cannot contain control characters")]
    FilenameControlChar,
    /// Windows device name such as `CON` or `LPT1`
    #[error("filename cannot be a reserved name: {0}")]
    ReservedFilename(&'static str),

    /// Empty email
    #[error("email cannot be empty")]
    EmptyEmail,
    /// Email without a `local@domain.tld` shape
    #[error("invalid email format: {0}")]
    EmailFormat(String),

    /// Empty username
    #[error("username cannot be empty")]
    EmptyUsername,
    /// Username shorter than [`USERNAME_MIN_LEN`]
    #[error("username must be at least 3 characters")]
    UsernameTooShort,
    /// Username longer than [`USERNAME_MAX_LEN`]
    #[error("username must be at most 50 characters")]
    UsernameTooLong,
    /// Username with characters outside `[A-Za-z0-9_.-]`
    #[error("username can only contain letters, numbers, underscores, hyphens, and dots")]
    UsernameCharset,

    /// Page number below zero
    #[error("page number must be >= 0")]
    NegativePageNumber,
    /// Page size of zero or less
    #[error("page size must be greater than 0")]
    PageSizeTooSmall,
    /// Page size above [`MAX_PAGE_SIZE`]
    #[error("page size must be at most 100")]
    PageSizeTooLarge,
}

/// Validate a UUID in canonical hyphenated form.
///
/// # Errors
///
/// Returns [`ValidationError`] if the value is empty, not shaped like
/// `xxxxxxxx-xxxx-xxxx-xxxx-xxxxxxxxxxxx`, or rejected by the UUID parser.
pub fn validate_uuid(id: &str) -> Result<(), ValidationError> {
    if id.is_empty() {
        return Err(ValidationError::EmptyUuid);
    }
    if !UUID_PATTERN.is_match(id) {
        return Err(ValidationError::UuidFormat(id.to_string()));
    }
    Uuid::try_parse(id)
        .map(drop)
        .map_err(|e| ValidationError::UuidParse(e.to_string()))
}

/// Validate a remote folder or file path.
///
/// Paths are absolute and Unix-style: they start with `/`, never contain
/// `..`, backslashes, NUL bytes or control characters.
///
/// # Errors
///
/// Returns the first rule the path violates.
pub fn validate_path(path: &str) -> Result<(), ValidationError> {
    if path.is_empty() {
        return Err(ValidationError::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(ValidationError::PathNotAbsolute);
    }
    if path.contains("..") {
        return Err(ValidationError::PathTraversal);
    }
    if path.contains('\\') {
        return Err(ValidationError::PathBackslash);
    }
    if path.contains('\0') {
        return Err(ValidationError::PathNullByte);
    }
    if path.chars().any(is_control) {
        return Err(ValidationError::PathControlChar);
    }
    Ok(())
}

/// Validate a bare filename (no directory component).
///
/// # Errors
///
/// Returns the first rule the filename violates, including the Windows
/// reserved device names with or without an extension.
pub fn validate_filename(filename: &str) -> Result<(), ValidationError> {
    if filename.is_empty() {
        return Err(ValidationError::EmptyFilename);
    }
    // A name is its own basename only when it has no separator at all.
    if filename.contains('\\') || filename.contains('/') {
        return Err(ValidationError::FilenameSeparator);
    }
    if filename == "." || filename == ".." {
        return Err(ValidationError::FilenameDots);
    }
    if filename.contains('\0') {
        return Err(ValidationError::FilenameNullByte);
    }
    if filename.chars().any(is_control) {
        return Err(ValidationError::FilenameControlChar);
    }
    if let Some(reserved) = reserved_name(filename) {
        return Err(ValidationError::ReservedFilename(reserved));
    }
    Ok(())
}

/// Validate an email address (`local@domain.tld`).
///
/// # Errors
///
/// Returns [`ValidationError`] if the value is empty or malformed.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmptyEmail);
    }
    if !EMAIL_PATTERN.is_match(email) {
        return Err(ValidationError::EmailFormat(email.to_string()));
    }
    Ok(())
}

/// Validate a username: 3 to 50 characters of `[A-Za-z0-9._-]`.
///
/// # Errors
///
/// Returns [`ValidationError`] describing the length or charset violation.
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.is_empty() {
        return Err(ValidationError::EmptyUsername);
    }
    let length = username.chars().count();
    if length < USERNAME_MIN_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if length > USERNAME_MAX_LEN {
        return Err(ValidationError::UsernameTooLong);
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(ValidationError::UsernameCharset);
    }
    Ok(())
}

/// Validate a zero-based page number.
///
/// # Errors
///
/// Returns [`ValidationError::NegativePageNumber`] for negative values.
pub const fn validate_page_number(page: i64) -> Result<(), ValidationError> {
    if page < 0 {
        return Err(ValidationError::NegativePageNumber);
    }
    Ok(())
}

/// Validate a page size in `1..=100`.
///
/// # Errors
///
/// Returns [`ValidationError`] when the size is out of range.
pub const fn validate_page_size(size: i64) -> Result<(), ValidationError> {
    if size <= 0 {
        return Err(ValidationError::PageSizeTooSmall);
    }
    if size > MAX_PAGE_SIZE {
        return Err(ValidationError::PageSizeTooLarge);
    }
    Ok(())
}

const fn is_control(c: char) -> bool {
    (c as u32) < 32
}

/// Reserved device name matched by `filename`, case-insensitively, either
/// exactly or followed by an extension.
fn reserved_name(filename: &str) -> Option<&'static str> {
    let upper = filename.to_uppercase();
    RESERVED_FILENAMES.iter().copied().find(|reserved| {
        upper == *reserved
            || upper
                .strip_prefix(reserved)
                .is_some_and(|rest| rest.starts_with('.'))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_UUIDS: &[&str] = &[
        "550e8400-e29b-41d4-a716-446655440000",
        "550E8400-E29B-41D4-A716-446655440000",
        "550e8400-E29b-41d4-A716-446655440000",
        "00000000-0000-0000-0000-000000000000",
        "ffffffff-ffff-ffff-ffff-ffffffffffff",
    ];

    const INVALID_UUIDS: &[&str] = &[
        "",
        "550e8400e29b41d4a716446655440000",
        "550e8400_e29b_41d4_a716_446655440000",
        "550e8400-e29b-41d4-a716-44665544000",
        "550e8400-e29b-41d4-a716-44665544000g",
        "550e8400-e29b-41d4-a716",
        "{550e8400-e29b-41d4-a716-446655440000}",
        "urn:uuid:550e8400-e29b-41d4-a716-446655440000",
        "not-a-uuid",
        "12345",
    ];

    #[test]
    fn test_validate_uuid() {
        for id in VALID_UUIDS {
            assert!(validate_uuid(id).is_ok(), "expected {id:?} to be valid");
        }
        for id in INVALID_UUIDS {
            assert!(validate_uuid(id).is_err(), "expected {id:?} to be rejected");
        }
        assert_eq!(validate_uuid(""), Err(ValidationError::EmptyUuid));
        assert_eq!(validate_uuid("550E8400-E29B-41D4-A716-446655440000"), Ok(()));
    }

    #[test]
    fn test_uuid_wrong_length_always_fails() {
        let base = "550e8400-e29b-41d4-a716-446655440000";
        for len in 1..base.len() {
            assert!(validate_uuid(&base[..len]).is_err(), "prefix of length {len}");
        }
        assert!(validate_uuid(&format!("{base}0")).is_err());
        assert!(validate_uuid(&format!("{base}-")).is_err());
    }

    #[test]
    fn test_validate_path() {
        for path in [
            "/",
            "/documents",
            "/documents/photos",
            "/documents/photos/2024",
            "/a",
            "/very/long/path/with/many/segments",
            "/photos/my vacation",
        ] {
            assert!(validate_path(path).is_ok(), "expected {path:?} to be valid");
        }

        let cases = [
            ("", ValidationError::EmptyPath),
            ("documents", ValidationError::PathNotAbsolute),
            ("../etc/passwd", ValidationError::PathNotAbsolute),
            ("/documents/../etc", ValidationError::PathTraversal),
            ("/documents/..", ValidationError::PathTraversal),
            ("/docs/file..txt", ValidationError::PathTraversal),
            ("/documents\\photos", ValidationError::PathBackslash),
            ("/documents\0/photos", ValidationError::PathNullByte),
            ("/documents\t/photos", ValidationError::PathControlChar),
            ("/documents\n/photos", ValidationError::PathControlChar),
            ("/documents\r/photos", ValidationError::PathControlChar),
        ];
        for (path, expected) in cases {
            assert_eq!(validate_path(path), Err(expected), "path {path:?}");
        }
    }

    #[test]
    fn test_dot_dot_never_passes() {
        let prefixes = ["", "/", "/a", "/a/", "/a/b.", "\\"];
        let suffixes = ["", "/", "x", "/b", ".txt"];
        for prefix in prefixes {
            for suffix in suffixes {
                let path = format!("{prefix}..{suffix}");
                assert!(validate_path(&path).is_err(), "path {path:?}");
            }
        }
    }

    #[test]
    fn test_backslash_always_fails() {
        for value in ["\\", "/a\\b", "a\\b", "\\a.txt", "/docs/\\"] {
            assert!(validate_path(value).is_err(), "path {value:?}");
            assert!(validate_filename(value).is_err(), "filename {value:?}");
        }
    }

    #[test]
    fn test_validate_filename() {
        for name in [
            "document.pdf",
            "my_file.txt",
            "my-file.txt",
            "file123.txt",
            "test.file.name.txt",
            "a",
            "very-long-filename-with-many-characters.txt",
            "CONTRACT.txt",
            "console.log",
            "COM10",
            "LPT0.txt",
            ".hidden",
        ] {
            assert!(validate_filename(name).is_ok(), "expected {name:?} to be valid");
        }

        let cases = [
            ("", ValidationError::EmptyFilename),
            ("documents/file.txt", ValidationError::FilenameSeparator),
            ("trailing/", ValidationError::FilenameSeparator),
            ("/", ValidationError::FilenameSeparator),
            ("folder\\test.txt", ValidationError::FilenameSeparator),
            (".", ValidationError::FilenameDots),
            ("..", ValidationError::FilenameDots),
            ("file\0.txt", ValidationError::FilenameNullByte),
            ("file\t.txt", ValidationError::FilenameControlChar),
            ("file\n.txt", ValidationError::FilenameControlChar),
        ];
        for (name, expected) in cases {
            assert_eq!(validate_filename(name), Err(expected), "filename {name:?}");
        }
    }

    #[test]
    fn test_reserved_filenames() {
        for reserved in RESERVED_FILENAMES {
            let lower = reserved.to_lowercase();
            for name in [
                reserved.to_string(),
                lower.clone(),
                format!("{reserved}.txt"),
                format!("{lower}.tar.gz"),
            ] {
                assert_eq!(
                    validate_filename(&name),
                    Err(ValidationError::ReservedFilename(reserved)),
                    "filename {name:?}"
                );
            }
        }
        assert!(validate_filename("CON").is_err());
        assert!(validate_filename("con.txt").is_err());
        assert!(validate_filename("CONTRACT.txt").is_ok());
    }

    #[test]
    fn test_validate_email() {
        for email in [
            "user@example.com",
            "user@mail.example.com",
            "user+tag@example.com",
            "user.name@example.com",
            "user_name@example.com",
            "user123@example.com",
            "test@subdomain.example.com",
            "percent%sign@example.org",
        ] {
            assert!(validate_email(email).is_ok(), "expected {email:?} to be valid");
        }
        for email in [
            "",
            "userexample.com",
            "user@",
            "@example.com",
            "user@example",
            "user@example.c",
            "user name@example.com",
            "user@name@example.com",
            "user@@example.com",
            "user@example.c0m",
        ] {
            assert!(validate_email(email).is_err(), "expected {email:?} to be rejected");
        }
        assert_eq!(validate_email(""), Err(ValidationError::EmptyEmail));
    }

    #[test]
    fn test_validate_username() {
        for name in ["abc", "john_doe", "jane-doe", "j.doe", "User123", "a".repeat(50).as_str()] {
            assert!(validate_username(name).is_ok(), "expected {name:?} to be valid");
        }
        assert_eq!(validate_username(""), Err(ValidationError::EmptyUsername));
        assert_eq!(validate_username("ab"), Err(ValidationError::UsernameTooShort));
        assert_eq!(
            validate_username(&"a".repeat(51)),
            Err(ValidationError::UsernameTooLong)
        );
        for name in ["john doe", "john@doe", "jöhn", "user/name", "user\\name"] {
            assert_eq!(
                validate_username(name),
                Err(ValidationError::UsernameCharset),
                "username {name:?}"
            );
        }
    }

    #[test]
    fn test_pagination() {
        assert!(validate_page_number(0).is_ok());
        assert!(validate_page_number(42).is_ok());
        assert_eq!(
            validate_page_number(-1),
            Err(ValidationError::NegativePageNumber)
        );

        assert_eq!(validate_page_size(0), Err(ValidationError::PageSizeTooSmall));
        assert_eq!(validate_page_size(-5), Err(ValidationError::PageSizeTooSmall));
        assert_eq!(
            validate_page_size(101),
            Err(ValidationError::PageSizeTooLarge)
        );
        assert!(validate_page_size(1).is_ok());
        assert!(validate_page_size(100).is_ok());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ValidationError::ReservedFilename("CON").to_string(),
            "filename cannot be a reserved name: CON"
        );
        assert_eq!(
            ValidationError::UsernameTooShort.to_string(),
            "username must be at least 3 characters"
        );
        assert_eq!(
            ValidationError::PageSizeTooLarge.to_string(),
            "page size must be at most 100"
        );
    }
}
