//! Hook configuration for Claude Code integration
//!
//! Registers `wezfocus capture --hook-stdin` as a `Notification` hook in
//! `~/.claude/settings.json`, and removes it again. Other hooks and
//! settings are left alone.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{json, Value};

/// The hook type capture runs under.
const HOOK_TYPE: &str = "Notification";

/// Substring identifying a wezfocus hook command.
const HOOK_MARKER: &str = "wezfocus";

/// Returns the path to Claude Code settings.json
fn claude_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".claude").join("settings.json"))
}

/// The capture command for the running executable.
fn capture_command() -> Result<String> {
    let exe = std::env::current_exe().context("Could not determine wezfocus executable path")?;
    Ok(format!("\"{}\" capture --hook-stdin", exe.display()))
}

/// Reads settings, returns empty object if file doesn't exist
fn read_settings(path: &Path) -> Result<Value> {
    if !path.exists() {
        return Ok(json!({}));
    }

    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    if content.trim().is_empty() {
        return Ok(json!({}));
    }

    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_settings(path: &Path, settings: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    let content = serde_json::to_string_pretty(settings)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn create_hook_entry(command: &str) -> Value {
    json!({
        "hooks": [{
            "type": "command",
            "command": command
        }]
    })
}

fn is_wezfocus_entry(entry: &Value) -> bool {
    entry
        .get("hooks")
        .and_then(|h| h.as_array())
        .is_some_and(|hooks| {
            hooks.iter().any(|hook| {
                hook.get("command")
                    .and_then(|c| c.as_str())
                    .is_some_and(|cmd| cmd.contains(HOOK_MARKER))
            })
        })
}

/// Adds the hook to the settings file at `path`.
///
/// Returns `false` if a wezfocus hook was already present.
///
/// # Errors
///
/// Fails if the file is unreadable, not JSON, or has a `hooks` section of
/// the wrong shape.
pub fn install_into(path: &Path, command: &str) -> Result<bool> {
    let mut settings = read_settings(path)?;
    let root = settings
        .as_object_mut()
        .with_context(|| format!("{} is not a JSON object", path.display()))?;

    let hooks = root
        .entry("hooks")
        .or_insert_with(|| json!({}))
        .as_object_mut()
        .context("hooks is not an object")?;

    let entries = hooks
        .entry(HOOK_TYPE)
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .context("Notification hooks is not an array")?;

    if entries.iter().any(is_wezfocus_entry) {
        return Ok(false);
    }

    entries.push(create_hook_entry(command));
    write_settings(path, &settings)?;
    Ok(true)
}

/// Removes wezfocus hooks from the settings file at `path`.
///
/// Returns the number of entries removed. A missing file removes nothing.
///
/// # Errors
///
/// Fails if the file is unreadable or not JSON.
pub fn remove_from(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let mut settings = read_settings(path)?;

    let Some(hooks) = settings.get_mut("hooks").and_then(|h| h.as_object_mut()) else {
        return Ok(0);
    };
    let Some(entries) = hooks.get_mut(HOOK_TYPE).and_then(|h| h.as_array_mut()) else {
        return Ok(0);
    };

    let before = entries.len();
    entries.retain(|entry| !is_wezfocus_entry(entry));
    let removed = before - entries.len();

    if entries.is_empty() {
        hooks.remove(HOOK_TYPE);
    }

    if removed > 0 {
        write_settings(path, &settings)?;
    }
    Ok(removed)
}

/// Installs the wezfocus hook into Claude Code settings
pub fn setup() -> Result<()> {
    println!("Setting up wezfocus...\n");

    let path = claude_settings_path().context("Could not determine home directory")?;
    let command = capture_command()?;

    print!("Configuring {HOOK_TYPE} hook in {}... ", path.display());
    if install_into(&path, &command)? {
        println!("added");
        println!("  {command}");
    } else {
        println!("already configured");
    }

    println!("\nNext step:");
    println!("  Point your notification's click action at: wezfocus focus");

    Ok(())
}

/// Removes the wezfocus hook from Claude Code settings
pub fn uninstall() -> Result<()> {
    println!("Uninstalling wezfocus...\n");

    let path = claude_settings_path().context("Could not determine home directory")?;
    match remove_from(&path)? {
        0 => println!("  No hooks found"),
        n => println!("  {HOOK_TYPE} - removed {n} hook(s)"),
    }

    println!("\nwezfocus uninstalled successfully!");
    Ok(())
}
