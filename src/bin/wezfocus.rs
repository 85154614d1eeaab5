//! wezfocus - bring the WezTerm tab behind a Claude Code notification to
//! the front.
//!
//! # Usage
//!
//! ```text
//! wezfocus capture --hook-stdin   # Notification hook: remember this session
//! wezfocus focus                  # Toast click: focus the remembered session
//! wezfocus show                   # Print the cached snapshot
//! wezfocus setup                  # Register the Claude Code hook
//! wezfocus uninstall              # Remove the hook
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info, warn};

use wezfocus_app::hook::{select_project_dir, HookInput, PROJECT_DIR_ENV};
use wezfocus_app::{capture_and_store, logging, restore_focus, setup, CaptureContext, Config};
use wezfocus_core::CacheStore;
use wezfocus_win::platform_window_manager;

// ============================================================================
// CLI Arguments
// ============================================================================

/// Focus the WezTerm tab that raised a Claude Code notification
#[derive(Parser, Debug)]
#[command(name = "wezfocus")]
#[command(about = "Restore focus to the WezTerm session behind a notification")]
#[command(version)]
struct Args {
    /// Config file (default: <config dir>/wezfocus/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Snapshot cache file, overrides config and WEZFOCUS_CACHE
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record the current session's window, tab and pane
    Capture {
        /// Project directory of the session
        #[arg(long)]
        project_dir: Option<String>,

        /// Read a Claude Code hook payload from stdin
        #[arg(long)]
        hook_stdin: bool,
    },
    /// Bring the recorded session's window to the foreground
    Focus,
    /// Print the cached snapshot
    Show,
    /// Configure the Claude Code Notification hook
    Setup,
    /// Remove the wezfocus hook from Claude Code
    Uninstall,
}

// ============================================================================
// Commands
// ============================================================================

fn capture(config: &Config, project_dir: Option<String>, hook_stdin: bool) {
    let hook = if hook_stdin {
        HookInput::read_from(io::stdin().lock())
    } else {
        None
    };
    if let Some(hook) = &hook {
        info!(
            session_id = ?hook.session_id,
            event = ?hook.hook_event_name,
            notification_type = ?hook.notification_type,
            "Hook payload received"
        );
        if !hook.should_capture() {
            info!(
                notification_type = ?hook.notification_type,
                "Notification type skipped, cache left alone"
            );
            return;
        }
    }

    let Some(project_dir) = select_project_dir(
        project_dir,
        hook.as_ref(),
        std::env::var(PROJECT_DIR_ENV).ok(),
        std::env::current_dir().ok(),
    ) else {
        warn!("No project directory available, nothing captured");
        return;
    };

    let store = CacheStore::new(config.cache_path());
    let wm = platform_window_manager();
    capture_and_store(
        &config.wezterm(),
        wm.as_ref(),
        &CaptureContext::from_env(project_dir),
        &config.capture_settings(),
        &store,
    );
}

fn focus(config: &Config) -> ExitCode {
    let store = CacheStore::new(config.cache_path());
    let wm = platform_window_manager();
    let outcome = restore_focus(
        &store,
        &config.wezterm(),
        wm.as_ref(),
        &config.resolver_settings(),
    );

    if outcome.succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn show(config: &Config) -> Result<()> {
    let store = CacheStore::new(config.cache_path());
    match store.load()? {
        Some(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
        None => println!("no snapshot at {}", store.path().display()),
    }
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    // Handle setup commands first (before logging and config)
    match args.command {
        Command::Setup => return setup::setup().map(|()| ExitCode::SUCCESS),
        Command::Uninstall => return setup::uninstall().map(|()| ExitCode::SUCCESS),
        _ => {}
    }

    let config = match Config::discover(args.config.as_deref()) {
        Ok(config) => config.with_cache_override(args.cache),
        Err(e) => {
            // No console under a hook or toast click, only the default log.
            if logging::init(Config::default().log_path().as_deref()).is_ok() {
                error!(error = %e, command = ?args.command, "Failed to load configuration");
            }
            return Err(anyhow::Error::new(e).context("Failed to load configuration"));
        }
    };

    if let Command::Show = args.command {
        show(&config)?;
        return Ok(ExitCode::SUCCESS);
    }

    logging::init(config.log_path().as_deref()).context("Failed to install log subscriber")?;
    info!(command = ?args.command, cache = %config.cache_path().display(), "wezfocus starting");

    match args.command {
        Command::Capture {
            project_dir,
            hook_stdin,
        } => {
            capture(&config, project_dir, hook_stdin);
            Ok(ExitCode::SUCCESS)
        }
        Command::Focus => Ok(focus(&config)),
        Command::Show | Command::Setup | Command::Uninstall => Ok(ExitCode::SUCCESS),
    }
}
