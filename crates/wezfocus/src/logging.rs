//! Debug log setup.
//!
//! wezfocus runs from a hook and from a toast click, neither of which has a
//! console, so diagnostics go to a log file only. If the file can't be
//! opened logging is switched off rather than falling back to stderr.

use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
pub const DEFAULT_DIRECTIVE: &str = "wezfocus=debug";

/// Opens the log file for appending, creating parent directories.
pub fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    OpenOptions::new().create(true).append(true).open(path).ok()
}

/// Builds the filter: `RUST_LOG` if set, plus the default directive.
///
/// Target matching is by prefix, so the directive covers every
/// `wezfocus_*` crate.
pub fn filter() -> EnvFilter {
    EnvFilter::from_default_env().add_directive(
        DEFAULT_DIRECTIVE
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::filter::Directive::from(tracing::Level::DEBUG)),
    )
}

/// Installs the global subscriber.
///
/// Returns `Ok(true)` if logging to `path` is active and `Ok(false)` if the
/// file could not be opened and logging is off.
///
/// # Errors
///
/// Fails if a global subscriber is already installed.
pub fn init(path: Option<&Path>) -> Result<bool, TryInitError> {
    match path.and_then(open_log_file) {
        Some(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .finish()
                .try_init()?;
            Ok(true)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::new("off"))
                .finish()
                .try_init()?;
            Ok(false)
        }
    }
}
