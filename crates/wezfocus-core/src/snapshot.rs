//! Session snapshot - the unit of correlation between capture and resolve.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// Type-Safe Identifiers
// ============================================================================

/// Opaque OS window identifier.
///
/// On Windows this is the numeric value of an `HWND`. It is only meaningful
/// while the window it names is alive; a cached handle may point at a
/// closed window or, after reuse, at an unrelated one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(i64);

impl WindowHandle {
    /// Wraps a raw handle value.
    pub const fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// Returns the raw handle value.
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// ============================================================================
// Session Snapshot
// ============================================================================

/// Last-known identity of the terminal session that raised a notification.
///
/// Only `project_dir` is guaranteed. Every other field is best-effort and
/// may be stale by the time the snapshot is read back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// Working directory of the session.
    pub project_dir: String,

    /// OS window believed to host the session.
    #[serde(default, deserialize_with = "lenient")]
    pub hwnd: Option<WindowHandle>,

    /// WezTerm window id of the session's tab.
    #[serde(default, deserialize_with = "lenient")]
    pub window_id: Option<u64>,

    /// WezTerm pane that was active when captured.
    #[serde(default, deserialize_with = "lenient")]
    pub pane_id: Option<u64>,

    /// WezTerm mux socket the session belongs to.
    #[serde(default, deserialize_with = "lenient")]
    pub wezterm_socket: Option<String>,

    /// When the snapshot was taken.
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub captured_at: Option<DateTime<Utc>>,
}

/// Reads an optional field, mapping a value of the wrong shape to `None`.
///
/// Only `project_dir` is required; a bad `hwnd` must not cost the rest of
/// the record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(parsed) => Ok(Some(parsed)),
        Err(e) => {
            debug!(error = %e, "Ignoring malformed snapshot field");
            Ok(None)
        }
    }
}

impl SessionSnapshot {
    /// Creates a snapshot carrying only the project directory.
    pub fn for_project(project_dir: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            hwnd: None,
            window_id: None,
            pane_id: None,
            wezterm_socket: None,
            captured_at: None,
        }
    }

    /// Stamps the snapshot with the current time.
    #[must_use]
    pub fn captured_now(mut self) -> Self {
        self.captured_at = Some(Utc::now());
        self
    }

    /// Parses a cache payload.
    ///
    /// - Empty payload: `None`
    /// - JSON object: parsed snapshot, or `None` if it is torn or malformed
    /// - Anything else: legacy format, the trimmed text is the project dir
    pub fn parse(payload: &str) -> Option<Self> {
        let trimmed = payload.trim();
        if trimmed.is_empty() {
            return None;
        }

        if trimmed.starts_with('{') {
            return match serde_json::from_str::<Self>(trimmed) {
                Ok(snapshot) if !snapshot.project_dir.trim().is_empty() => Some(snapshot),
                Ok(_) => {
                    debug!("Cached snapshot has empty project_dir");
                    None
                }
                Err(e) => {
                    debug!(error = %e, "Cached snapshot is not valid JSON, treating as absent");
                    None
                }
            };
        }

        debug!("Cache holds a legacy plain-text project dir");
        Some(Self::for_project(trimmed))
    }

    /// Returns true if the snapshot carries a window handle worth validating.
    #[must_use]
    pub fn has_window_handle(&self) -> bool {
        self.hwnd.is_some()
    }

    /// Age of the snapshot, if it was timestamped.
    pub fn age(&self) -> Option<chrono::Duration> {
        self.captured_at.map(|at| Utc::now() - at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_record() {
        let payload = r#"{"project_dir":"C:/proj","hwnd":132456,"window_id":2,"pane_id":7,"wezterm_socket":"C:/Users/me/.local/share/wezterm/gui-sock-1234"}"#;
        let snapshot = SessionSnapshot::parse(payload).unwrap();
        assert_eq!(snapshot.project_dir, "C:/proj");
        assert_eq!(snapshot.hwnd, Some(WindowHandle::new(132_456)));
        assert_eq!(snapshot.window_id, Some(2));
        assert_eq!(snapshot.pane_id, Some(7));
        assert!(snapshot.wezterm_socket.unwrap().ends_with("gui-sock-1234"));
        assert!(snapshot.captured_at.is_none());
    }

    #[test]
    fn test_parse_nulls_and_missing_fields() {
        let snapshot =
            SessionSnapshot::parse(r#"{"project_dir":"C:/proj","hwnd":null,"pane_id":null}"#)
                .unwrap();
        assert_eq!(snapshot, SessionSnapshot::for_project("C:/proj"));
    }

    #[test]
    fn test_parse_legacy_plain_text() {
        let snapshot = SessionSnapshot::parse("C:\\Users\\me\\proj\r\n").unwrap();
        assert_eq!(snapshot.project_dir, "C:\\Users\\me\\proj");
        assert!(!snapshot.has_window_handle());
        assert!(snapshot.pane_id.is_none());
    }

    #[test]
    fn test_parse_empty_is_absent() {
        assert!(SessionSnapshot::parse("").is_none());
        assert!(SessionSnapshot::parse("  \n").is_none());
    }

    #[test]
    fn test_parse_torn_json_is_absent() {
        assert!(SessionSnapshot::parse(r#"{"project_dir":"C:/pr"#).is_none());
        assert!(SessionSnapshot::parse(r#"{"hwnd":5}"#).is_none());
        assert!(SessionSnapshot::parse(r#"{"project_dir":""}"#).is_none());
    }

    #[test]
    fn test_parse_malformed_optional_fields_keeps_project_dir() {
        let snapshot = SessionSnapshot::parse(
            r#"{"project_dir":"C:/proj","hwnd":"0x1234","window_id":-1,"pane_id":3.5,"wezterm_socket":7,"captured_at":"yesterday"}"#,
        )
        .unwrap();
        assert_eq!(snapshot, SessionSnapshot::for_project("C:/proj"));
    }

    #[test]
    fn test_parse_keeps_valid_fields_next_to_malformed_ones() {
        let snapshot =
            SessionSnapshot::parse(r#"{"project_dir":"C:/proj","hwnd":[1],"pane_id":9}"#).unwrap();
        assert_eq!(snapshot.hwnd, None);
        assert_eq!(snapshot.pane_id, Some(9));
    }

    #[test]
    fn test_serialized_keys() {
        let mut snapshot = SessionSnapshot::for_project("C:/proj");
        snapshot.hwnd = Some(WindowHandle::new(42));
        let value = serde_json::to_value(&snapshot).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["project_dir", "hwnd", "window_id", "pane_id", "wezterm_socket"] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj.get("hwnd").and_then(|v| v.as_i64()), Some(42));
        assert!(!obj.contains_key("captured_at"));
    }

    #[test]
    fn test_captured_now_sets_age() {
        let snapshot = SessionSnapshot::for_project("C:/proj").captured_now();
        let age = snapshot.age().unwrap();
        assert!(age.num_seconds() < 5);
    }

    #[test]
    fn test_window_handle_display() {
        assert_eq!(WindowHandle::new(255).to_string(), "0xff");
    }
}
