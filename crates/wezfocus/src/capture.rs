//! Session identity capture.
//!
//! Runs when a notification fires, inside the hook process that belongs to
//! the terminal session. WezTerm tells us which pane we are in
//! (`WEZTERM_PANE`) and which mux window that pane lives in, but not which
//! OS window shows that mux window. The two are correlated by tab count:
//! WezTerm prefixes OS window titles with `[N/M]`, and the listing tells us
//! how many tabs each mux window has.
//!
//! Capture never fails. Anything that goes wrong leaves the corresponding
//! snapshot fields empty and the resolver falls back at click time.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};
use wezfocus_core::title::window_tab_count;
use wezfocus_core::{CacheStore, SessionSnapshot, TitleHeuristics, WindowHandle};
use wezfocus_mux::{Multiplexer, TabRecord, PANE_ENV, SOCKET_ENV};
use wezfocus_win::{OsWindow, WindowManager};

/// What capture knows about the session before asking anyone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureContext {
    pub project_dir: String,
    /// Pane id from `WEZTERM_PANE`.
    pub pane_id: Option<u64>,
    /// Socket from `WEZTERM_UNIX_SOCKET`.
    pub socket: Option<String>,
}

impl CaptureContext {
    /// Builds a context from the process environment.
    pub fn from_env(project_dir: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            pane_id: std::env::var(PANE_ENV)
                .ok()
                .and_then(|v| v.trim().parse().ok()),
            socket: std::env::var(SOCKET_ENV).ok().filter(|v| !v.is_empty()),
        }
    }
}

/// Settings for capture.
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    pub window_class: String,
    pub heuristics: TitleHeuristics,
}

/// Result of correlating a mux window with OS windows by tab count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabCountMatch {
    /// Exactly one OS window has the target's tab count.
    Unique(WindowHandle),
    /// Several OS windows share the target's tab count; the first in
    /// enumeration order was chosen.
    Ambiguous {
        chosen: WindowHandle,
        candidates: usize,
    },
    /// No OS window has the target's tab count, or the target mux window
    /// is unknown.
    NoMatch,
}

impl TabCountMatch {
    /// The chosen handle, if any.
    pub fn handle(&self) -> Option<WindowHandle> {
        match self {
            Self::Unique(handle) => Some(*handle),
            Self::Ambiguous { chosen, .. } => Some(*chosen),
            Self::NoMatch => None,
        }
    }
}

/// Counts distinct tabs per mux window, skipping auxiliary program tabs.
pub fn tab_counts_by_window(
    tabs: &[TabRecord],
    heuristics: &TitleHeuristics,
) -> BTreeMap<u64, usize> {
    let mut tab_ids: BTreeMap<u64, BTreeSet<u64>> = BTreeMap::new();
    for tab in tabs.iter().filter(|t| !heuristics.is_auxiliary(&t.title)) {
        tab_ids.entry(tab.window_id).or_default().insert(tab.tab_id);
    }
    tab_ids
        .into_iter()
        .map(|(window_id, ids)| (window_id, ids.len()))
        .collect()
}

/// Finds the OS window showing mux window `target_window_id`.
pub fn match_by_tab_count(
    tabs: &[TabRecord],
    windows: &[OsWindow],
    target_window_id: u64,
    heuristics: &TitleHeuristics,
) -> TabCountMatch {
    let counts = tab_counts_by_window(tabs, heuristics);
    let Some(&target_count) = counts.get(&target_window_id) else {
        debug!(target_window_id, "Target window has no countable tabs");
        return TabCountMatch::NoMatch;
    };

    let candidates: Vec<&OsWindow> = windows
        .iter()
        .filter(|w| window_tab_count(&w.title) == target_count)
        .collect();

    match candidates.as_slice() {
        [] => {
            debug!(target_window_id, target_count, "No OS window with matching tab count");
            TabCountMatch::NoMatch
        }
        [only] => TabCountMatch::Unique(only.handle),
        [first, ..] => {
            warn!(
                target_window_id,
                target_count,
                candidates = candidates.len(),
                chosen = %first.handle,
                "Several windows share the tab count, using the first"
            );
            TabCountMatch::Ambiguous {
                chosen: first.handle,
                candidates: candidates.len(),
            }
        }
    }
}

/// Builds a snapshot for the session described by `ctx`.
pub fn capture_snapshot<M, W>(
    mux: &M,
    wm: &W,
    ctx: &CaptureContext,
    settings: &CaptureSettings,
) -> SessionSnapshot
where
    M: Multiplexer + ?Sized,
    W: WindowManager + ?Sized,
{
    let mut snapshot = SessionSnapshot::for_project(ctx.project_dir.clone()).captured_now();

    let tabs = match mux.list_tabs() {
        Ok(tabs) => tabs,
        Err(e) => {
            warn!(error = %e, "Listing wezterm tabs failed, capturing project dir only");
            return snapshot;
        }
    };

    snapshot.pane_id = ctx.pane_id;
    snapshot.wezterm_socket = ctx.socket.clone();

    let Some(pane_id) = ctx.pane_id else {
        debug!("No pane id in environment");
        return snapshot;
    };

    snapshot.window_id = tabs
        .iter()
        .find(|t| t.pane_id == pane_id)
        .map(|t| t.window_id);
    let Some(window_id) = snapshot.window_id else {
        debug!(pane_id, "Pane not found in wezterm listing");
        return snapshot;
    };

    let windows = wm.enumerate(&settings.window_class);
    let matched = match_by_tab_count(&tabs, &windows, window_id, &settings.heuristics);
    snapshot.hwnd = matched.handle();

    info!(
        project_dir = %snapshot.project_dir,
        pane_id,
        window_id,
        os_windows = windows.len(),
        ?matched,
        "Captured session identity"
    );
    snapshot
}

/// Captures a snapshot and writes it to the cache.
///
/// A failed write is logged, not returned.
pub fn capture_and_store<M, W>(
    mux: &M,
    wm: &W,
    ctx: &CaptureContext,
    settings: &CaptureSettings,
    store: &CacheStore,
) -> SessionSnapshot
where
    M: Multiplexer + ?Sized,
    W: WindowManager + ?Sized,
{
    let snapshot = capture_snapshot(mux, wm, ctx, settings);
    if let Err(e) = store.store(&snapshot) {
        warn!(error = %e, "Failed to write session snapshot");
    }
    snapshot
}
