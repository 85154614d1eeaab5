//! The window-manager port.

use wezfocus_core::WindowHandle;

/// OS thread identifier, as used for input-queue attachment.
pub type ThreadId = u32;

/// A top-level window as seen by the OS window manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OsWindow {
    pub handle: WindowHandle,
    pub title: String,
    pub visible: bool,
    pub class_name: String,
}

/// Operations needed from the OS window manager.
///
/// Failures are reported as `false`/`None`: a window vanishing or the OS
/// refusing a focus change is an expected outcome, not an error.
pub trait WindowManager {
    /// Visible top-level windows of `class_name`, in Z order.
    fn enumerate(&self, class_name: &str) -> Vec<OsWindow>;

    /// Describes a window, or `None` if the handle no longer names one.
    fn inspect(&self, handle: WindowHandle) -> Option<OsWindow>;

    /// The current foreground window.
    fn foreground(&self) -> Option<WindowHandle>;

    fn is_minimized(&self, handle: WindowHandle) -> bool;

    /// Restores a minimized window.
    fn restore(&self, handle: WindowHandle) -> bool;

    /// Thread that owns the window.
    fn window_thread(&self, handle: WindowHandle) -> Option<ThreadId>;

    /// Thread this process is running on.
    fn current_thread(&self) -> ThreadId;

    /// Attaches (or detaches) the input queue of `from` to that of `to`.
    fn attach_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> bool;

    fn bring_to_top(&self, handle: WindowHandle) -> bool;

    fn set_foreground(&self, handle: WindowHandle) -> bool;
}

impl<W: WindowManager + ?Sized> WindowManager for Box<W> {
    fn enumerate(&self, class_name: &str) -> Vec<OsWindow> {
        (**self).enumerate(class_name)
    }
    fn inspect(&self, handle: WindowHandle) -> Option<OsWindow> {
        (**self).inspect(handle)
    }
    fn foreground(&self) -> Option<WindowHandle> {
        (**self).foreground()
    }
    fn is_minimized(&self, handle: WindowHandle) -> bool {
        (**self).is_minimized(handle)
    }
    fn restore(&self, handle: WindowHandle) -> bool {
        (**self).restore(handle)
    }
    fn window_thread(&self, handle: WindowHandle) -> Option<ThreadId> {
        (**self).window_thread(handle)
    }
    fn current_thread(&self) -> ThreadId {
        (**self).current_thread()
    }
    fn attach_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> bool {
        (**self).attach_input(from, to, attach)
    }
    fn bring_to_top(&self, handle: WindowHandle) -> bool {
        (**self).bring_to_top(handle)
    }
    fn set_foreground(&self, handle: WindowHandle) -> bool {
        (**self).set_foreground(handle)
    }
}

/// Window manager for platforms without Win32: sees no windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedWindowManager;

impl WindowManager for UnsupportedWindowManager {
    fn enumerate(&self, _class_name: &str) -> Vec<OsWindow> {
        Vec::new()
    }
    fn inspect(&self, _handle: WindowHandle) -> Option<OsWindow> {
        None
    }
    fn foreground(&self) -> Option<WindowHandle> {
        None
    }
    fn is_minimized(&self, _handle: WindowHandle) -> bool {
        false
    }
    fn restore(&self, _handle: WindowHandle) -> bool {
        false
    }
    fn window_thread(&self, _handle: WindowHandle) -> Option<ThreadId> {
        None
    }
    fn current_thread(&self) -> ThreadId {
        0
    }
    fn attach_input(&self, _from: ThreadId, _to: ThreadId, _attach: bool) -> bool {
        false
    }
    fn bring_to_top(&self, _handle: WindowHandle) -> bool {
        false
    }
    fn set_foreground(&self, _handle: WindowHandle) -> bool {
        false
    }
}

/// The window manager for the running platform.
pub fn platform_window_manager() -> Box<dyn WindowManager> {
    #[cfg(windows)]
    {
        Box::new(crate::win32::Win32WindowManager)
    }
    #[cfg(not(windows))]
    {
        Box::new(UnsupportedWindowManager)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_sees_nothing() {
        let wm = UnsupportedWindowManager;
        assert!(wm.enumerate("org.wezfurlong.wezterm").is_empty());
        assert!(wm.inspect(WindowHandle::new(1)).is_none());
        assert!(!wm.set_foreground(WindowHandle::new(1)));
    }

    #[cfg(not(windows))]
    #[test]
    fn test_platform_manager_off_windows() {
        assert!(platform_window_manager().enumerate("any").is_empty());
    }
}
