//! Error types for the capture and resolve stages.
//!
//! Most failures in this crate are recovered locally by falling back to the
//! next tier, so only two things surface as errors: a configuration file the
//! user got wrong, and a desktop with no WezTerm window at all.
//!
//! **Panic-Free Policy:** This module follows the project's panic-free guidelines.
//! No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, or `todo!()`.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

// ============================================================================
// Config Error
// ============================================================================

/// Errors loading the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file exists but could not be read.
    ///
    /// An explicitly requested file that does not exist also lands here;
    /// only the default location is allowed to be missing.
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML or has fields of the wrong type.
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

// ============================================================================
// Resolve Error
// ============================================================================

/// Resolution failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Every tier failed and no window of the class exists.
    #[error("No visible window of class {class}")]
    NoWindows { class: String },
}
