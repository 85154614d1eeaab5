//! Resolver fallback chain against scripted multiplexer and desktop.
//!
//! Tests CAN use `.unwrap()` and `.expect()`.

mod support;

use std::fs;

use support::{resolver_settings, tab, FakeMux, MuxCall, CLASS};
use wezfocus_app::{restore_focus, Resolution, ResolveError, Resolver};
use wezfocus_core::{CacheStore, SessionSnapshot, WindowHandle};
use wezfocus_win::testing::{FakeWindow, FakeWindowManager};
use wezfocus_win::{ThreadId, WindowManager};

// ============================================================================
// Test Helpers
// ============================================================================

const SELF_THREAD: ThreadId = 1;

/// Two WezTerm windows plus an unrelated one in front.
fn desktop() -> FakeWindowManager {
    let wm = FakeWindowManager::new(SELF_THREAD);
    wm.add(FakeWindow::new(0x10, "[1/2] pwsh", CLASS).thread(200));
    wm.add(FakeWindow::new(0x20, "[2/3] ✳ Claude Code", CLASS).thread(300));
    wm.add(FakeWindow::new(0x99, "Inbox - Mail", "MailWindow").thread(900));
    wm.set_current_foreground(Some(WindowHandle::new(0x99)));
    wm
}

/// Listing matching [`desktop`]: mux window 0 has two tabs, mux window 1
/// has three, the project tab is tab 4.
fn listing() -> FakeMux {
    FakeMux::with_tabs(vec![
        tab(0, 0).cwd("file:///C:/Users/me/").title("pwsh").window_title("pwsh").build(),
        tab(0, 1).cwd("file:///C:/src/").title("vim").window_title("pwsh").build(),
        tab(1, 2).cwd("file:///C:/proj/").title("pwsh").window_title("✳ Claude Code").build(),
        tab(1, 3).cwd("file:///D:/other/").title("⠐ Other").window_title("✳ Claude Code").build(),
        tab(1, 4)
            .cwd("file:///C:/proj/")
            .title("✳ Claude Code")
            .window_title("✳ Claude Code")
            .build(),
    ])
}

fn cached(hwnd: Option<i64>) -> SessionSnapshot {
    let mut snapshot = SessionSnapshot::for_project("C:\\proj");
    snapshot.hwnd = hwnd.map(WindowHandle::new);
    snapshot.window_id = Some(1);
    snapshot.pane_id = Some(4);
    snapshot.wezterm_socket = Some("C:/Users/me/.local/share/wezterm/gui-sock-42".to_string());
    snapshot
}

// ============================================================================
// Tier 1: cached handle
// ============================================================================

#[test]
fn test_valid_cached_handle_skips_enumeration() {
    let wm = desktop();
    let mux = listing();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&cached(Some(0x20))))
        .unwrap();

    assert_eq!(
        resolution,
        Resolution::CachedHandle {
            handle: WindowHandle::new(0x20),
            pane_activated: true
        }
    );
    assert_eq!(wm.enumerations(), 0);
    assert_eq!(
        mux.calls(),
        vec![MuxCall::ActivatePane(
            4,
            Some("C:/Users/me/.local/share/wezterm/gui-sock-42".to_string())
        )]
    );
}

#[test]
fn test_pane_activation_failure_is_ignored() {
    let wm = desktop();
    let mux = listing().failing_activation();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&cached(Some(0x20))))
        .unwrap();

    assert_eq!(
        resolution,
        Resolution::CachedHandle {
            handle: WindowHandle::new(0x20),
            pane_activated: false
        }
    );
}

#[test]
fn test_cached_handle_of_other_class_is_rejected() {
    let wm = desktop();
    let mux = listing();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&cached(Some(0x99))))
        .unwrap();

    assert_ne!(resolution.handle(), WindowHandle::new(0x99));
    assert_eq!(resolution.tier(), "tab-title");
}

#[test]
fn test_hidden_cached_window_is_stale() {
    let wm = FakeWindowManager::new(SELF_THREAD);
    wm.add(FakeWindow::new(0x10, "✳ Claude Code", CLASS).hidden());
    wm.add(FakeWindow::new(0x20, "pwsh", CLASS));
    let mux = FakeMux::hung();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&cached(Some(0x10))))
        .unwrap();

    assert_eq!(
        resolution,
        Resolution::FirstWindow {
            handle: WindowHandle::new(0x20)
        }
    );
}

// ============================================================================
// Tier 2: tab by cwd
// ============================================================================

#[test]
fn test_closed_window_falls_back_to_project_tab() {
    let wm = desktop();
    let mux = listing();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&cached(Some(0x77))))
        .unwrap();

    assert_eq!(
        resolution,
        Resolution::TabTitle {
            handle: WindowHandle::new(0x20),
            tab_id: 4,
            window_title: "✳ Claude Code".to_string(),
        }
    );
    assert!(mux.calls().contains(&MuxCall::ActivateTab(4)));
}

#[test]
fn test_marker_tab_found_without_handle() {
    let wm = FakeWindowManager::new(SELF_THREAD);
    wm.add(FakeWindow::new(0x30, "[1/2] ✳ Claude Code", CLASS));
    let mux = FakeMux::with_tabs(vec![
        tab(0, 7).cwd("file:///C:/proj/").title("✳ Claude Code").window_title("✳ Claude Code").build(),
        tab(0, 8).cwd("file:///C:/elsewhere/").title("pwsh").window_title("✳ Claude Code").build(),
    ]);
    let settings = resolver_settings();
    let snapshot = SessionSnapshot::for_project("C:\\proj");

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&snapshot))
        .unwrap();

    assert_eq!(resolution.handle(), WindowHandle::new(0x30));
    assert_eq!(resolution.tier(), "tab-title");
    assert_eq!(
        mux.calls(),
        vec![MuxCall::List, MuxCall::ActivateTab(7), MuxCall::List]
    );
}

#[test]
fn test_tab_activation_failure_uses_marker() {
    let wm = desktop();
    let mux = listing().failing_activation();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&cached(None)))
        .unwrap();

    assert_eq!(
        resolution,
        Resolution::Marker {
            handle: WindowHandle::new(0x20)
        }
    );
}

// ============================================================================
// Tier 3: OS window by title
// ============================================================================

#[test]
fn test_no_snapshot_uses_marker_without_mux() {
    let wm = desktop();
    let mux = listing();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings).resolve(None).unwrap();

    assert_eq!(resolution.handle(), WindowHandle::new(0x20));
    assert!(mux.calls().is_empty());
}

#[test]
fn test_hung_mux_without_markers_uses_first_window() {
    let wm = FakeWindowManager::new(SELF_THREAD);
    wm.add(FakeWindow::new(0x40, "[1/2] pwsh", CLASS));
    wm.add(FakeWindow::new(0x50, "vim", CLASS));
    let mux = FakeMux::hung();
    let settings = resolver_settings();

    let resolution = Resolver::new(&mux, &wm, &settings)
        .resolve(Some(&cached(None)))
        .unwrap();

    assert_eq!(
        resolution,
        Resolution::FirstWindow {
            handle: WindowHandle::new(0x40)
        }
    );
}

#[test]
fn test_no_windows_is_error() {
    let wm = FakeWindowManager::new(SELF_THREAD);
    wm.add(FakeWindow::new(0x99, "✳ not wezterm", "Other"));
    let mux = FakeMux::hung();
    let settings = resolver_settings();

    let err = Resolver::new(&mux, &wm, &settings).resolve(None).unwrap_err();
    assert_eq!(
        err,
        ResolveError::NoWindows {
            class: CLASS.to_string()
        }
    );
}

#[test]
fn test_resolution_is_idempotent() {
    let wm = desktop();
    let mux = listing();
    let settings = resolver_settings();
    let resolver = Resolver::new(&mux, &wm, &settings);
    let snapshot = cached(None);

    let first = resolver.resolve(Some(&snapshot)).unwrap();
    let second = resolver.resolve(Some(&snapshot)).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// End-to-end
// ============================================================================

#[test]
fn test_restore_focus_from_cache_file() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path().join("notification_session.json"));
    store.store(&cached(Some(0x20))).unwrap();

    let wm = desktop();
    let mux = listing();

    let outcome = restore_focus(&store, &mux, &wm, &resolver_settings());

    assert!(outcome.succeeded());
    let report = outcome.report.unwrap();
    assert_eq!(report.before, Some(WindowHandle::new(0x99)));
    assert_eq!(report.after, Some(WindowHandle::new(0x20)));
    assert!(wm.active_attachments().is_empty());
}

#[test]
fn test_restore_focus_with_minimal_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notification_session.json");
    fs::write(&path, r#"{"project_dir": "C:\\proj"}"#).unwrap();

    let wm = desktop();
    let mux = listing();

    let outcome = restore_focus(&CacheStore::new(path), &mux, &wm, &resolver_settings());

    assert!(outcome.succeeded());
    assert_eq!(outcome.resolution.unwrap().tier(), "tab-title");
}

#[test]
fn test_restore_focus_with_legacy_cache() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notification_session.json");
    fs::write(&path, "C:\\proj\r\n").unwrap();

    let wm = desktop();
    let mux = listing();

    let outcome = restore_focus(&CacheStore::new(path), &mux, &wm, &resolver_settings());

    assert_eq!(outcome.resolution.unwrap().handle(), WindowHandle::new(0x20));
    assert!(mux.calls().contains(&MuxCall::ActivateTab(4)));
}

#[test]
fn test_restore_focus_restores_minimized_window() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path().join("missing.json"));

    let wm = FakeWindowManager::new(SELF_THREAD);
    wm.add(FakeWindow::new(0x60, "✳ Claude Code", CLASS).minimized());
    let mux = FakeMux::hung();

    let outcome = restore_focus(&store, &mux, &wm, &resolver_settings());

    let report = outcome.report.unwrap();
    assert!(report.restored);
    assert!(report.verified());
    assert!(!wm.is_minimized(WindowHandle::new(0x60)));
}

#[test]
fn test_restore_focus_denied() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path().join("missing.json"));

    let wm = desktop();
    wm.deny_foreground(true);
    let mux = listing();

    let outcome = restore_focus(&store, &mux, &wm, &resolver_settings());

    assert!(outcome.resolution.is_ok());
    assert!(!outcome.succeeded());
    assert!(wm.active_attachments().is_empty());
}

#[test]
fn test_restore_focus_without_windows() {
    let dir = tempfile::tempdir().unwrap();
    let store = CacheStore::new(dir.path().join("missing.json"));
    let wm = FakeWindowManager::new(SELF_THREAD);
    let mux = FakeMux::hung();

    let outcome = restore_focus(&store, &mux, &wm, &resolver_settings());

    assert!(!outcome.succeeded());
    assert!(outcome.report.is_none());
    assert!(matches!(
        outcome.resolution,
        Err(ResolveError::NoWindows { .. })
    ));
}
