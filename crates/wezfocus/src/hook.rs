//! Claude Code hook payload and project directory selection.

use std::io::Read;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

/// Environment variable Claude Code sets to the project root for hooks.
pub const PROJECT_DIR_ENV: &str = "CLAUDE_PROJECT_DIR";

/// Notification types that must not replace the cached snapshot.
///
/// `idle_prompt` fires for any idle session and would overwrite the
/// snapshot of a session whose permission toast is still pending.
pub const SKIPPED_NOTIFICATION_TYPES: &[&str] = &["idle_prompt"];

/// The subset of the hook JSON on stdin that capture cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HookInput {
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub cwd: Option<String>,
    #[serde(default)]
    pub hook_event_name: Option<String>,
    #[serde(default)]
    pub notification_type: Option<String>,
}

impl HookInput {
    /// Reads and parses the hook payload.
    ///
    /// Returns `None` on empty or malformed input.
    pub fn read_from<R: Read>(mut reader: R) -> Option<Self> {
        let mut bytes = Vec::new();
        if let Err(e) = reader.read_to_end(&mut bytes) {
            debug!(error = %e, "Failed to read hook stdin");
            return None;
        }
        let text = String::from_utf8_lossy(&bytes);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        match serde_json::from_str(text) {
            Ok(input) => Some(input),
            Err(e) => {
                debug!(error = %e, "Hook stdin is not valid JSON");
                None
            }
        }
    }

    /// Returns false for notifications that should leave the cache alone.
    #[must_use]
    pub fn should_capture(&self) -> bool {
        self.notification_type
            .as_deref()
            .map_or(true, |kind| !SKIPPED_NOTIFICATION_TYPES.contains(&kind))
    }
}

/// Picks the project directory: explicit flag, then the hook payload's
/// `cwd`, then `CLAUDE_PROJECT_DIR`, then the process working directory.
pub fn select_project_dir(
    explicit: Option<String>,
    hook: Option<&HookInput>,
    env_dir: Option<String>,
    process_dir: Option<PathBuf>,
) -> Option<String> {
    let non_empty = |s: &String| !s.trim().is_empty();
    explicit
        .filter(non_empty)
        .or_else(|| hook.and_then(|h| h.cwd.clone()).filter(non_empty))
        .or_else(|| env_dir.filter(non_empty))
        .or_else(|| process_dir.map(|p| p.to_string_lossy().into_owned()))
}
