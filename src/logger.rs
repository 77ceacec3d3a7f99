//! Diagnostic logging to stderr
//!
//! Stdout carries command output only, so log lines go to stderr. The
//! dispatcher is installed at most once per process.

use crate::error::{CliError, Result};
use fern::colors::Color::{Blue, Green, Magenta, Red, Yellow};
use fern::colors::ColoredLevelConfig;
use fern::Dispatch;
use log::{debug, LevelFilter};
use std::io::stderr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Once;

/// Thread-safe initialization guard.
static INIT_LOGGER_ONCE: Once = Once::new();

/// Tracks if logger initialization was already attempted.
static LOGGER_ALREADY_CALLED: AtomicBool = AtomicBool::new(false);

/// Level used without `--verbose`
pub const DEFAULT_LEVEL: LevelFilter = LevelFilter::Warn;

/// Level used with `--verbose`
pub const VERBOSE_LEVEL: LevelFilter = LevelFilter::Debug;

/// Level filter for the given verbosity
#[must_use]
pub const fn level_for(verbose: bool) -> LevelFilter {
    if verbose {
        VERBOSE_LEVEL
    } else {
        DEFAULT_LEVEL
    }
}

/// Install the stderr logger.
///
/// Safe to call more than once; only the first call has any effect.
///
/// # Errors
///
/// Returns [`CliError::Internal`] if another global logger is already set.
pub fn initialize(verbose: bool) -> Result<()> {
    if LOGGER_ALREADY_CALLED.swap(true, Ordering::SeqCst) {
        return Ok(());
    }

    let mut result = Ok(());
    let level = level_for(verbose);

    INIT_LOGGER_ONCE.call_once(|| {
        result = initialize_internal(level);
        if result.is_ok() {
            debug!("Logger initialized with level: {level}");
        }
    });

    result
}

fn initialize_internal(level: LevelFilter) -> Result<()> {
    let colors = ColoredLevelConfig::new()
        .debug(Blue)
        .info(Green)
        .warn(Yellow)
        .error(Red)
        .trace(Magenta);

    Dispatch::new()
        .level(LevelFilter::Warn)
        .level_for(env!("CARGO_CRATE_NAME"), level)
        .format(move |out, message, record| {
            out.finish(format_args!(
                "[{date} {level}] {message}",
                date = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
                level = colors.color(record.level()),
            ));
        })
        .chain(stderr())
        .apply()
        .map_err(|e| CliError::Internal(format!("Failed to initialize logger: {e}")))
}
