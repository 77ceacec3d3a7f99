#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]

//! # Cloud Storage CLI
//!
//! Command-line client for the Cloud Storage API.
//!
//! ## Architecture
//!
//! - **[`client`]** - Authenticated HTTP transport: JSON requests, multipart
//!   uploads, streamed downloads and error normalization
//! - **[`validation`]** - Checks for identifiers, paths, names and paging
//! - **[`api`]** - Typed wrappers for each API endpoint
//! - **[`config`]** - Configuration file, environment overrides and credentials
//! - **[`error`]** - Error types and exit codes
//! - **[`logger`]** - Stderr logging
//! - **[`cli`]** / **[`commands`]** - Argument parsing and command handlers

pub mod api;
pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod validation;

/// Error type alias for convenience
pub use error::{CliError, Result};

/// Configuration type alias for convenience
pub use config::Config;

/// Transport client
pub use client::{ApiClient, ApiError, ClientConfig, Credential};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = "cloud-storage";
