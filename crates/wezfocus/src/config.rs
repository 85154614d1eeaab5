//! Configuration.
//!
//! Read from `<config_dir>/wezfocus/config.toml` unless a path is given on
//! the command line or in `WEZFOCUS_CONFIG`. Every field is optional; a
//! missing default file means all defaults.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wezfocus_core::{TitleHeuristics, DEFAULT_AUXILIARY_TITLES, DEFAULT_TITLE_MARKERS};
use wezfocus_mux::{Invoker, WezTermCli};

use crate::capture::CaptureSettings;
use crate::error::ConfigError;
use crate::resolver::ResolverSettings;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "WEZFOCUS_CONFIG";

/// Environment variable naming the cache file.
pub const CACHE_ENV: &str = "WEZFOCUS_CACHE";

/// Window class WezTerm registers its top-level windows under.
pub const WEZTERM_WINDOW_CLASS: &str = "org.wezfurlong.wezterm";

const APP_DIR: &str = "wezfocus";

/// User configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Snapshot cache file.
    pub cache_path: Option<PathBuf>,
    /// Debug log file.
    pub log_path: Option<PathBuf>,
    /// WezTerm executable.
    pub wezterm_bin: String,
    /// OS window class of WezTerm windows.
    pub window_class: String,
    /// Timeout for `wezterm cli list` and `activate-tab`.
    pub cli_timeout_ms: u64,
    /// Timeout for `wezterm cli activate-pane` on the fast path.
    pub pane_activate_timeout_ms: u64,
    /// Interval between child liveness checks.
    pub poll_interval_ms: u64,
    /// Delay before re-sampling the foreground window for the log.
    pub settle_ms: u64,
    /// Title glyphs of an active Claude Code session.
    pub title_markers: Vec<String>,
    /// Tab titles excluded from tab counting.
    pub auxiliary_titles: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: None,
            log_path: None,
            wezterm_bin: "wezterm".to_string(),
            window_class: WEZTERM_WINDOW_CLASS.to_string(),
            cli_timeout_ms: 5_000,
            pane_activate_timeout_ms: 2_000,
            poll_interval_ms: 500,
            settle_ms: 500,
            title_markers: DEFAULT_TITLE_MARKERS.iter().map(|s| (*s).to_string()).collect(),
            auxiliary_titles: DEFAULT_AUXILIARY_TITLES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl Config {
    /// Default config file location.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Loads the config from `explicit`, then `WEZFOCUS_CONFIG`, then the
    /// default location.
    ///
    /// # Errors
    ///
    /// Fails if an explicitly named file is missing, or any file is
    /// unreadable or invalid.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|v| !v.is_empty()) {
            return Self::load_from(Path::new(&path));
        }
        match Self::default_path() {
            Some(path) => Self::load_optional(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads a config file that must exist.
    ///
    /// # Errors
    ///
    /// `ConfigError::Read` or `ConfigError::Parse`.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Loads a config file, falling back to defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// `ConfigError::Read` or `ConfigError::Parse`.
    pub fn load_optional(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies the cache path override: the CLI flag wins, then
    /// `WEZFOCUS_CACHE`.
    #[must_use]
    pub fn with_cache_override(mut self, cli: Option<PathBuf>) -> Self {
        let env = std::env::var_os(CACHE_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        if let Some(path) = cli.or(env) {
            self.cache_path = Some(path);
        }
        self
    }

    /// Snapshot cache file, explicit or default.
    pub fn cache_path(&self) -> PathBuf {
        self.cache_path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join(APP_DIR)
                .join("notification_session.json")
        })
    }

    /// Debug log file, explicit or default.
    pub fn log_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.log_path {
            return Some(path.clone());
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .map(|d| d.join(APP_DIR).join("wezfocus.log"))
    }

    /// Title heuristics built from the marker and denylist settings.
    pub fn heuristics(&self) -> TitleHeuristics {
        TitleHeuristics {
            markers: self.title_markers.clone(),
            auxiliary: self.auxiliary_titles.clone(),
        }
    }

    /// WezTerm CLI client with the configured timeouts.
    pub fn wezterm(&self) -> WezTermCli {
        WezTermCli::new(self.wezterm_bin.clone())
            .with_invoker(
                Invoker::new().with_poll_interval(Duration::from_millis(self.poll_interval_ms)),
            )
            .with_timeout(Duration::from_millis(self.cli_timeout_ms))
            .with_pane_timeout(Duration::from_millis(self.pane_activate_timeout_ms))
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            window_class: self.window_class.clone(),
            heuristics: self.heuristics(),
        }
    }

    pub fn resolver_settings(&self) -> ResolverSettings {
        ResolverSettings {
            window_class: self.window_class.clone(),
            heuristics: self.heuristics(),
            settle: Duration::from_millis(self.settle_ms),
        }
    }
}
