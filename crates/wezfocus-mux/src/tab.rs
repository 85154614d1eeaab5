//! Tab records reported by `wezterm cli list --format json`.

use serde::{Deserialize, Serialize};

use crate::error::MuxResult;

/// One row of the WezTerm pane listing.
///
/// WezTerm emits one row per pane, so a tab split into several panes shows
/// up several times with the same `tab_id`. Fields beyond the ids default
/// when absent; older WezTerm releases omit some of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabRecord {
    pub window_id: u64,
    pub tab_id: u64,
    pub pane_id: u64,
    #[serde(default)]
    pub workspace: String,
    /// Pane title, as set by the program running in it.
    #[serde(default)]
    pub title: String,
    /// `file://` URI of the pane's working directory.
    #[serde(default)]
    pub cwd: String,
    #[serde(default)]
    pub window_title: String,
    #[serde(default)]
    pub tab_title: String,
    #[serde(default)]
    pub is_active: bool,
}

/// Parses the JSON array printed by the listing command.
///
/// # Errors
///
/// Returns `MuxError::InvalidOutput` if the bytes are not a JSON array of
/// tab records.
pub fn parse_tab_list(bytes: &[u8]) -> MuxResult<Vec<TabRecord>> {
    let text = String::from_utf8_lossy(bytes);
    Ok(serde_json::from_str(text.trim_start_matches('\u{feff}'))?)
}
