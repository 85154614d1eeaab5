//! Window resolution and focus restoration.
//!
//! Runs when a notification is clicked. The cached snapshot is turned back
//! into a live window through a ranked chain of tiers, first success wins:
//!
//! 1. Cached handle: still a visible WezTerm window? Re-activate the
//!    cached pane and use it. No enumeration.
//! 2. Tab by cwd: find the WezTerm tab whose cwd is the project dir,
//!    activate it, and learn its window title.
//! 3. OS window by title: the window containing that title, else one
//!    showing a Claude Code marker glyph, else the first WezTerm window.
//!
//! Each tier is a separate method so it can be tested on its own.

use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};
use wezfocus_core::{same_directory, CacheStore, SessionSnapshot, TitleHeuristics, WindowHandle};
use wezfocus_mux::{Multiplexer, TabRecord};
use wezfocus_win::{bring_to_foreground, is_valid_target, FocusReport, WindowManager};

use crate::error::ResolveError;

// ============================================================================
// Settings & Results
// ============================================================================

/// Settings for resolution.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub window_class: String,
    pub heuristics: TitleHeuristics,
    /// Delay before re-sampling the foreground for the log. Zero skips it.
    pub settle: Duration,
}

/// Which tier produced the window, and what it found on the way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The cached handle was still valid.
    CachedHandle {
        handle: WindowHandle,
        pane_activated: bool,
    },
    /// Matched the window title of the tab found by cwd.
    TabTitle {
        handle: WindowHandle,
        tab_id: u64,
        window_title: String,
    },
    /// First window whose title carries a session marker.
    Marker { handle: WindowHandle },
    /// Nothing better; first window of the class.
    FirstWindow { handle: WindowHandle },
}

impl Resolution {
    pub fn handle(&self) -> WindowHandle {
        match self {
            Self::CachedHandle { handle, .. }
            | Self::TabTitle { handle, .. }
            | Self::Marker { handle }
            | Self::FirstWindow { handle } => *handle,
        }
    }

    /// Short tier name for logs.
    pub fn tier(&self) -> &'static str {
        match self {
            Self::CachedHandle { .. } => "cached-handle",
            Self::TabTitle { .. } => "tab-title",
            Self::Marker { .. } => "marker",
            Self::FirstWindow { .. } => "first-window",
        }
    }
}

/// A WezTerm tab that was found by cwd and activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivatedTab {
    pub tab_id: u64,
    pub window_id: u64,
    /// Live window title after activation, if it could be read.
    pub window_title: Option<String>,
}

/// Picks the tab for `project_dir`: cwd must match, a tab showing a
/// session marker is preferred, otherwise the first match.
pub fn select_project_tab<'t>(
    tabs: &'t [TabRecord],
    project_dir: &str,
    heuristics: &TitleHeuristics,
) -> Option<&'t TabRecord> {
    let matching: Vec<&TabRecord> = tabs
        .iter()
        .filter(|t| same_directory(&t.cwd, project_dir))
        .collect();

    matching
        .iter()
        .find(|t| heuristics.has_marker(&t.title))
        .or_else(|| matching.first())
        .copied()
}

// ============================================================================
// Resolver
// ============================================================================

/// Runs the tier chain against a multiplexer and a window manager.
pub struct Resolver<'a, M: ?Sized, W: ?Sized> {
    mux: &'a M,
    wm: &'a W,
    settings: &'a ResolverSettings,
}

impl<'a, M, W> Resolver<'a, M, W>
where
    M: Multiplexer + ?Sized,
    W: WindowManager + ?Sized,
{
    pub fn new(mux: &'a M, wm: &'a W, settings: &'a ResolverSettings) -> Self {
        Self { mux, wm, settings }
    }

    /// Resolves a snapshot (or its absence) to a window.
    ///
    /// # Errors
    ///
    /// `ResolveError::NoWindows` if there is no window of the class at all.
    pub fn resolve(&self, snapshot: Option<&SessionSnapshot>) -> Result<Resolution, ResolveError> {
        if let Some(resolution) = snapshot.and_then(|s| self.try_cached_handle(s)) {
            return Ok(resolution);
        }

        let activated = snapshot.and_then(|s| self.activate_project_tab(&s.project_dir));
        self.match_window(activated.as_ref())
    }

    /// Tier 1: the cached handle, if still valid.
    pub fn try_cached_handle(&self, snapshot: &SessionSnapshot) -> Option<Resolution> {
        let handle = snapshot.hwnd?;
        if !is_valid_target(self.wm, handle, &self.settings.window_class) {
            info!(%handle, "Cached window handle is stale, falling back");
            return None;
        }

        let pane_activated = match snapshot.pane_id {
            Some(pane_id) => {
                match self
                    .mux
                    .activate_pane(pane_id, snapshot.wezterm_socket.as_deref())
                {
                    Ok(()) => true,
                    Err(e) => {
                        debug!(pane_id, error = %e, "Pane re-activation failed, ignoring");
                        false
                    }
                }
            }
            None => false,
        };

        Some(Resolution::CachedHandle {
            handle,
            pane_activated,
        })
    }

    /// Tier 2: find the project's tab by cwd and activate it.
    pub fn activate_project_tab(&self, project_dir: &str) -> Option<ActivatedTab> {
        let tabs = match self.mux.list_tabs() {
            Ok(tabs) => tabs,
            Err(e) => {
                warn!(error = %e, "Listing wezterm tabs failed");
                return None;
            }
        };

        let Some(selected) = select_project_tab(&tabs, project_dir, &self.settings.heuristics)
        else {
            warn!(project_dir, "No wezterm tab with matching cwd");
            return None;
        };

        if let Err(e) = self.mux.activate_tab(selected.tab_id) {
            warn!(tab_id = selected.tab_id, error = %e, "Failed to activate tab");
            return None;
        }

        let window_title = self
            .live_window_title(selected.window_id)
            .or_else(|| Some(selected.window_title.clone()).filter(|t| !t.is_empty()));

        debug!(
            tab_id = selected.tab_id,
            window_id = selected.window_id,
            ?window_title,
            "Activated project tab"
        );
        Some(ActivatedTab {
            tab_id: selected.tab_id,
            window_id: selected.window_id,
            window_title,
        })
    }

    /// Re-lists to read the window title after tab activation changed it.
    fn live_window_title(&self, window_id: u64) -> Option<String> {
        let tabs = self.mux.list_tabs().ok()?;
        tabs.into_iter()
            .find(|t| t.window_id == window_id)
            .map(|t| t.window_title)
            .filter(|t| !t.is_empty())
    }

    /// Tier 3: pick an OS window by title.
    ///
    /// # Errors
    ///
    /// `ResolveError::NoWindows` if no window of the class exists.
    pub fn match_window(&self, activated: Option<&ActivatedTab>) -> Result<Resolution, ResolveError> {
        let windows = self.wm.enumerate(&self.settings.window_class);
        let Some(first) = windows.first() else {
            warn!(class = %self.settings.window_class, "No wezterm window found");
            return Err(ResolveError::NoWindows {
                class: self.settings.window_class.clone(),
            });
        };

        // OS titles carry a "[N/M] " prefix the wezterm title lacks.
        if let Some((tab, title)) =
            activated.and_then(|a| a.window_title.as_deref().map(|title| (a, title)))
        {
            if let Some(window) = windows.iter().find(|w| w.title.contains(title)) {
                return Ok(Resolution::TabTitle {
                    handle: window.handle,
                    tab_id: tab.tab_id,
                    window_title: title.to_string(),
                });
            }
            debug!(title, "No window title contains the tab's window title");
        }

        if let Some(window) = windows
            .iter()
            .find(|w| self.settings.heuristics.has_marker(&w.title))
        {
            return Ok(Resolution::Marker {
                handle: window.handle,
            });
        }

        warn!(handle = %first.handle, "No match found, using first window");
        Ok(Resolution::FirstWindow {
            handle: first.handle,
        })
    }
}

// ============================================================================
// End-to-end
// ============================================================================

/// What a click achieved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusOutcome {
    pub resolution: Result<Resolution, ResolveError>,
    pub report: Option<FocusReport>,
}

impl FocusOutcome {
    /// A window was resolved and the focus transfer reported success.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.report.as_ref().is_some_and(FocusReport::succeeded)
    }
}

/// Reads the cache, resolves a window and brings it to the foreground.
pub fn restore_focus<M, W>(
    store: &CacheStore,
    mux: &M,
    wm: &W,
    settings: &ResolverSettings,
) -> FocusOutcome
where
    M: Multiplexer + ?Sized,
    W: WindowManager + ?Sized,
{
    let snapshot = match store.load() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(error = %e, "Cache unreadable, treating as absent");
            None
        }
    };

    match &snapshot {
        Some(s) => debug!(
            project_dir = %s.project_dir,
            hwnd = ?s.hwnd,
            pane_id = ?s.pane_id,
            age_secs = ?s.age().map(|a| a.num_seconds()),
            "Loaded session snapshot"
        ),
        None => warn!(path = %store.path().display(), "No session snapshot"),
    }

    let resolution = Resolver::new(mux, wm, settings).resolve(snapshot.as_ref());
    let report = match &resolution {
        Ok(resolved) => {
            info!(tier = resolved.tier(), handle = %resolved.handle(), "Resolved window");
            let report = bring_to_foreground(wm, resolved.handle());
            if !settings.settle.is_zero() {
                thread::sleep(settings.settle);
                debug!(later = ?wm.foreground(), "Foreground after settle delay");
            }
            Some(report)
        }
        Err(e) => {
            warn!(error = %e, "Could not resolve a window");
            None
        }
    };

    FocusOutcome { resolution, report }
}
