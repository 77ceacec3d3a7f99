//! Command-line interface argument parsing
//!
//! Defines all CLI commands and their arguments using Clap.

use crate::api::files::DEFAULT_PAGE_SIZE;
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Cloud Storage CLI - manage files, folders and API keys in Cloud Storage
#[derive(Parser, Debug)]
#[command(name = "cloud-storage")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage files, folders and API keys in Cloud Storage")]
#[command(long_about = concat!(
    "Cloud Storage CLI (v", env!("CARGO_PKG_VERSION"), ")\n",
    "Upload, list, search and download files, organise them into folders,\n",
    "and manage API keys for automated access.\n\n",
    "Start with 'cloud-storage auth login' or set an API key with\n",
    "'cloud-storage config set api-key <key>'."
))]
pub struct Cli {
    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API server URL for this invocation
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in, log out and inspect the current account
    #[command(subcommand, display_order = 1)]
    Auth(AuthCommand),

    /// Upload, list, search, download, update and delete files
    #[command(subcommand, display_order = 2)]
    File(FileCommand),

    /// Create, list, inspect and delete folders
    #[command(subcommand, display_order = 3)]
    Folder(FolderCommand),

    /// Generate and revoke API keys
    #[command(subcommand, display_order = 4)]
    Apikey(ApiKeyCommand),

    /// Monitor batch jobs
    #[command(subcommand, display_order = 5)]
    Batch(BatchCommand),

    /// Show and change CLI settings
    #[command(subcommand, display_order = 6)]
    Config(ConfigCommand),
}

/// Authentication commands
#[derive(Subcommand, Debug)]
pub enum AuthCommand {
    /// Log in and store the issued tokens
    ///
    /// Example:
    ///   cloud-storage auth login alice
    Login {
        /// Account username
        username: String,

        /// Password; prompted for when omitted
        #[arg(long, env = "CLOUD_STORAGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Create a new account
    ///
    /// Example:
    ///   cloud-storage auth register alice --email alice@example.com
    Register {
        /// Desired username
        username: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Password; prompted for when omitted
        #[arg(long, env = "CLOUD_STORAGE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Revoke the refresh token and forget stored tokens
    Logout,

    /// Obtain a new access token with the stored refresh token
    Refresh,

    /// Show the authenticated account
    Me,
}

/// Pagination and filter flags for listings
#[derive(Args, Debug, Clone)]
pub struct PageArgs {
    /// Page number (0-based)
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub page: i64,

    /// Page size (1-100)
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE, allow_negative_numbers = true)]
    pub size: i64,

    /// Only files with this content type (e.g. image/jpeg)
    #[arg(long)]
    pub content_type: Option<String>,

    /// Only files in this folder (e.g. /photos)
    #[arg(long)]
    pub folder_path: Option<String>,
}

/// File commands
#[derive(Subcommand, Debug)]
pub enum FileCommand {
    /// Upload a local file
    ///
    /// Examples:
    ///   cloud-storage file upload ./photo.jpg --folder-path /photos/2024
    ///   cloud-storage file upload ./report.pdf --filename custom-report.pdf
    Upload {
        /// Local file to upload
        file: PathBuf,

        /// Destination folder (e.g. /photos/2024)
        #[arg(long)]
        folder_path: Option<String>,

        /// Name to store the file under
        #[arg(long)]
        filename: Option<String>,
    },

    /// List files
    List {
        #[command(flatten)]
        page: PageArgs,

        /// Sort order (e.g. createdAt,desc)
        #[arg(long)]
        sort: Option<String>,
    },

    /// Search files by name
    Search {
        /// Text the filename must contain
        query: String,

        #[command(flatten)]
        page: PageArgs,
    },

    /// Show storage usage
    #[command(visible_alias = "stats")]
    Info,

    /// Download a file by ID or by path
    ///
    /// Examples:
    ///   cloud-storage file download 550e8400-e29b-41d4-a716-446655440000
    ///   cloud-storage file download /photos/beach.jpg --output ./downloads/
    Download {
        /// File ID or full path
        identifier: String,

        /// Directory or file to save to (defaults to the current directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Rename a file or move it to another folder
    Update {
        /// File ID
        id: String,

        /// New filename
        #[arg(long)]
        filename: Option<String>,

        /// New folder
        #[arg(long)]
        folder_path: Option<String>,
    },

    /// Delete a file
    Delete {
        /// File ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Folder commands
#[derive(Subcommand, Debug)]
pub enum FolderCommand {
    /// Create a folder
    Create {
        /// Folder path (e.g. /photos/2024)
        path: String,

        /// Optional description
        #[arg(long)]
        description: Option<String>,
    },

    /// List folders
    List {
        /// Only folders under this path
        #[arg(long)]
        parent_path: Option<String>,
    },

    /// Delete an empty folder
    Delete {
        /// Folder path
        path: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show folder usage
    #[command(visible_alias = "stats")]
    Info {
        /// Folder path
        path: String,
    },
}

/// API key commands
#[derive(Subcommand, Debug)]
pub enum ApiKeyCommand {
    /// Generate a new API key
    ///
    /// Example:
    ///   cloud-storage apikey generate --name ci --expires-at 2025-12-31T23:59:59Z
    Generate {
        /// Name to identify the key
        #[arg(long)]
        name: String,

        /// Expiry as an RFC 3339 timestamp
        #[arg(long)]
        expires_at: Option<DateTime<Utc>>,
    },

    /// List API keys
    List,

    /// Show one API key
    Get {
        /// API key ID
        id: String,
    },

    /// Revoke an API key
    Revoke {
        /// API key ID
        id: String,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Batch job commands
#[derive(Subcommand, Debug)]
pub enum BatchCommand {
    /// Show the status of a batch job
    Status {
        /// Batch job ID
        id: String,
    },
}

/// Configuration commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the effective configuration with secrets masked
    Show,

    /// Print one setting
    Get {
        /// api-url, access-token, refresh-token, api-key or timeout
        key: String,

        /// Print secrets in full
        #[arg(long)]
        reveal: bool,
    },

    /// Change one setting in the config file
    Set {
        /// api-url, access-token, refresh-token, api-key or timeout
        key: String,

        /// New value
        value: String,
    },

    /// Print the config file location
    Path,
}

impl Cli {
    /// Parse command-line arguments
    #[must_use]
    pub fn parse_args() -> Self {
        <Self as Parser>::parse()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "cloud-storage",
            "file",
            "list",
            "--size",
            "50",
            "--api-url",
            "http://example.com",
            "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://example.com"));
        let Commands::File(FileCommand::List { page, sort }) = cli.command else {
            panic!("expected file list");
        };
        assert_eq!(page.page, 0);
        assert_eq!(page.size, 50);
        assert!(sort.is_none());
    }

    #[test]
    fn parses_expiry_timestamp() {
        let cli = Cli::try_parse_from([
            "cloud-storage",
            "apikey",
            "generate",
            "--name",
            "ci",
            "--expires-at",
            "2025-12-31T23:59:59Z",
        ])
        .unwrap();

        let Commands::Apikey(ApiKeyCommand::Generate { expires_at, .. }) = cli.command else {
            panic!("expected apikey generate");
        };
        assert!(expires_at.is_some());

        assert!(Cli::try_parse_from([
            "cloud-storage",
            "apikey",
            "generate",
            "--name",
            "ci",
            "--expires-at",
            "next week",
        ])
        .is_err());
    }

    #[test]
    fn negative_page_reaches_validation() {
        let cli =
            Cli::try_parse_from(["cloud-storage", "file", "search", "x", "--page", "-1"]).unwrap();
        let Commands::File(FileCommand::Search { page, .. }) = cli.command else {
            panic!("expected file search");
        };
        assert_eq!(page.page, -1);
    }
}
