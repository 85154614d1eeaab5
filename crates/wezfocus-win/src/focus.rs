//! Foreground focus transfer.
//!
//! Windows only lets the process that owns the foreground (or one sharing
//! its input queue) change it. Attaching our input queue to both the
//! current foreground thread and the target's thread makes
//! `SetForegroundWindow` succeed without injecting synthetic input.
//! Attachments are held by [`InputAttachment`] guards and released on
//! drop, whatever the focus calls return.

use tracing::{debug, info, warn};
use wezfocus_core::WindowHandle;

use crate::port::{ThreadId, WindowManager};

/// Outcome of a focus transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusReport {
    pub target: WindowHandle,
    /// Foreground before the transfer.
    pub before: Option<WindowHandle>,
    /// Foreground right after the transfer.
    pub after: Option<WindowHandle>,
    /// The window was minimized and got restored.
    pub restored: bool,
    /// `SetForegroundWindow` reported success.
    pub set_foreground: bool,
}

impl FocusReport {
    /// Best-effort success: the target is verifiably in front, or the OS
    /// accepted the request.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.verified() || self.set_foreground
    }

    /// The target was read back as the foreground window.
    #[must_use]
    pub fn verified(&self) -> bool {
        self.after == Some(self.target)
    }
}

/// Returns true if `handle` still names a visible window of `class_name`.
pub fn is_valid_target<W: WindowManager + ?Sized>(
    wm: &W,
    handle: WindowHandle,
    class_name: &str,
) -> bool {
    match wm.inspect(handle) {
        Some(window) => {
            let valid = window.visible && window.class_name == class_name;
            debug!(
                %handle,
                visible = window.visible,
                class = %window.class_name,
                valid,
                "Validated cached window handle"
            );
            valid
        }
        None => {
            debug!(%handle, "Cached window handle no longer exists");
            false
        }
    }
}

/// Brings `target` to the foreground.
pub fn bring_to_foreground<W: WindowManager + ?Sized>(wm: &W, target: WindowHandle) -> FocusReport {
    let before = wm.foreground();
    debug!(?before, %target, "Foreground before focus");

    let restored = wm.is_minimized(target) && wm.restore(target);
    if restored {
        debug!(%target, "Restored minimized window");
    }

    let set_foreground = {
        let current = wm.current_thread();
        let foreground_thread = before.and_then(|fg| wm.window_thread(fg));
        let target_thread = wm.window_thread(target);

        let _to_foreground =
            foreground_thread.and_then(|thread| InputAttachment::attach(wm, current, thread));
        let _to_target = target_thread
            .filter(|thread| Some(*thread) != foreground_thread)
            .and_then(|thread| InputAttachment::attach(wm, current, thread));

        if !wm.bring_to_top(target) {
            debug!(%target, "BringWindowToTop failed");
        }
        wm.set_foreground(target)
    };

    let after = wm.foreground();
    let report = FocusReport {
        target,
        before,
        after,
        restored,
        set_foreground,
    };

    if report.verified() {
        info!(%target, "Window brought to foreground");
    } else {
        warn!(
            %target,
            ?after,
            set_foreground,
            "Foreground did not change to target, OS may have denied the transfer"
        );
    }
    report
}

// ============================================================================
// Input Attachment Guard
// ============================================================================

/// An attached input queue pair, detached on drop.
struct InputAttachment<'a, W: WindowManager + ?Sized> {
    wm: &'a W,
    from: ThreadId,
    to: ThreadId,
}

impl<'a, W: WindowManager + ?Sized> InputAttachment<'a, W> {
    fn attach(wm: &'a W, from: ThreadId, to: ThreadId) -> Option<Self> {
        if from == to {
            return None;
        }
        if wm.attach_input(from, to, true) {
            Some(Self { wm, from, to })
        } else {
            debug!(from, to, "AttachThreadInput failed");
            None
        }
    }
}

impl<W: WindowManager + ?Sized> Drop for InputAttachment<'_, W> {
    fn drop(&mut self) {
        if !self.wm.attach_input(self.from, self.to, false) {
            debug!(from = self.from, to = self.to, "Detaching thread input failed");
        }
    }
}
