//! Window and tab title heuristics.
//!
//! Titles are the only thing the OS window list and the WezTerm tab list
//! have in common, so correlation leans on three signals found in them:
//! the `[N/M]` tab position prefix WezTerm puts on OS window titles, the
//! spinner glyphs Claude Code puts in its tab title, and the names of
//! helper programs whose tabs should not be counted.

use serde::{Deserialize, Serialize};

/// Glyphs Claude Code shows in its terminal title while a session is live.
pub const DEFAULT_TITLE_MARKERS: &[&str] = &["⠂", "✳", "⠈", "⠐", "⠠", "⠄", "⠁"];

/// Helper programs that open short-lived tabs and skew tab counts.
pub const DEFAULT_AUXILIARY_TITLES: &[&str] = &["conhost.exe", "OpenConsole.exe", "wslhost.exe"];

/// Extracts `M` from the first well-formed `[N/M]` in a title.
///
/// Returns `None` if the title carries no such prefix.
pub fn tab_count(title: &str) -> Option<usize> {
    title.match_indices('[').find_map(|(start, _)| {
        let rest = title.get(start + 1..)?;
        let close = rest.find(']')?;
        let (index, total) = rest.get(..close)?.split_once('/')?;
        let index: usize = index.trim().parse().ok()?;
        let total: usize = total.trim().parse().ok()?;
        (index >= 1 && index <= total).then_some(total)
    })
}

/// Tab count of an OS window.
///
/// WezTerm omits the `[N/M]` prefix when a window has a single tab.
pub fn window_tab_count(title: &str) -> usize {
    tab_count(title).unwrap_or(1)
}

/// Configurable marker and denylist matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleHeuristics {
    /// Substrings identifying an active Claude Code session.
    pub markers: Vec<String>,
    /// Substrings (case-insensitive) identifying auxiliary program tabs.
    pub auxiliary: Vec<String>,
}

impl Default for TitleHeuristics {
    fn default() -> Self {
        Self {
            markers: DEFAULT_TITLE_MARKERS.iter().map(|s| (*s).to_string()).collect(),
            auxiliary: DEFAULT_AUXILIARY_TITLES
                .iter()
                .map(|s| (*s).to_string())
                .collect(),
        }
    }
}

impl TitleHeuristics {
    /// Returns true if the title carries a session marker glyph.
    pub fn has_marker(&self, title: &str) -> bool {
        self.markers
            .iter()
            .any(|marker| !marker.is_empty() && title.contains(marker.as_str()))
    }

    /// Returns true if the title belongs to an auxiliary program.
    pub fn is_auxiliary(&self, title: &str) -> bool {
        let lowered = title.to_lowercase();
        self.auxiliary
            .iter()
            .any(|name| !name.is_empty() && lowered.contains(&name.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tab_count_prefix() {
        assert_eq!(tab_count("[1/4] ✳ Claude Code"), Some(4));
        assert_eq!(tab_count("[12/12] pwsh"), Some(12));
    }

    #[test]
    fn test_tab_count_skips_malformed_brackets() {
        assert_eq!(tab_count("[draft] notes [2/3] vim"), Some(3));
        assert_eq!(tab_count("[a/b] x"), None);
        assert_eq!(tab_count("[5/3] x"), None);
        assert_eq!(tab_count("[0/3] x"), None);
        assert_eq!(tab_count("[1/3 x"), None);
    }

    #[test]
    fn test_window_tab_count_defaults_to_one() {
        assert_eq!(window_tab_count("✳ Claude Code"), 1);
        assert_eq!(window_tab_count("[2/2] pwsh"), 2);
    }

    #[test]
    fn test_has_marker() {
        let h = TitleHeuristics::default();
        assert!(h.has_marker("⠂ Fix the parser"));
        assert!(h.has_marker("[1/2] ✳ Claude Code"));
        assert!(!h.has_marker("pwsh.exe"));
    }

    #[test]
    fn test_is_auxiliary_case_insensitive() {
        let h = TitleHeuristics::default();
        assert!(h.is_auxiliary("C:\\Windows\\System32\\CONHOST.EXE"));
        assert!(h.is_auxiliary("wslhost.exe"));
        assert!(!h.is_auxiliary("✳ Claude Code"));
    }

    #[test]
    fn test_empty_entries_never_match() {
        let h = TitleHeuristics {
            markers: vec![String::new()],
            auxiliary: vec![String::new()],
        };
        assert!(!h.has_marker("anything"));
        assert!(!h.is_auxiliary("anything"));
    }
}
