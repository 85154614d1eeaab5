//! Win32 implementation of the window-manager port.

use std::ffi::c_void;

use tracing::{debug, warn};
use wezfocus_core::WindowHandle;
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, TRUE};
use windows::Win32::System::Threading::{AttachThreadInput, GetCurrentThreadId};
use windows::Win32::UI::WindowsAndMessaging::{
    BringWindowToTop, EnumWindows, GetClassNameW, GetForegroundWindow, GetWindowTextLengthW,
    GetWindowTextW, GetWindowThreadProcessId, IsIconic, IsWindow, IsWindowVisible,
    SetForegroundWindow, ShowWindow, SW_RESTORE,
};

use crate::port::{OsWindow, ThreadId, WindowManager};

/// Longest class name Win32 allows.
const MAX_CLASS_NAME: usize = 256;

/// [`WindowManager`] over user32.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32WindowManager;

fn to_hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.raw() as isize as *mut c_void)
}

fn to_handle(hwnd: HWND) -> WindowHandle {
    WindowHandle::new(hwnd.0 as isize as i64)
}

unsafe extern "system" fn collect_window(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the `&mut Vec<HWND>` passed to EnumWindows below,
    // which outlives the synchronous enumeration.
    let found = unsafe { &mut *(lparam.0 as *mut Vec<HWND>) };
    found.push(hwnd);
    TRUE
}

fn class_name(hwnd: HWND) -> String {
    let mut buf = [0u16; MAX_CLASS_NAME];
    // SAFETY: buf is a valid, writable UTF-16 buffer.
    let len = unsafe { GetClassNameW(hwnd, &mut buf) };
    let len = usize::try_from(len).unwrap_or(0).min(buf.len());
    String::from_utf16_lossy(buf.get(..len).unwrap_or_default())
}

fn window_title(hwnd: HWND) -> String {
    // SAFETY: hwnd is only read.
    let hint = unsafe { GetWindowTextLengthW(hwnd) };
    let mut buf = vec![0u16; usize::try_from(hint).unwrap_or(0) + 1];
    // SAFETY: buf is a valid, writable UTF-16 buffer.
    let len = unsafe { GetWindowTextW(hwnd, &mut buf) };
    let len = usize::try_from(len).unwrap_or(0).min(buf.len());
    String::from_utf16_lossy(buf.get(..len).unwrap_or_default())
}

fn describe(hwnd: HWND) -> Option<OsWindow> {
    // SAFETY: IsWindow accepts any handle value.
    if !unsafe { IsWindow(hwnd) }.as_bool() {
        return None;
    }
    Some(OsWindow {
        handle: to_handle(hwnd),
        title: window_title(hwnd),
        // SAFETY: hwnd was just validated.
        visible: unsafe { IsWindowVisible(hwnd) }.as_bool(),
        class_name: class_name(hwnd),
    })
}

impl WindowManager for Win32WindowManager {
    fn enumerate(&self, class: &str) -> Vec<OsWindow> {
        let mut found: Vec<HWND> = Vec::new();
        // SAFETY: the callback only touches `found`, which lives across the call.
        let result = unsafe {
            EnumWindows(
                Some(collect_window),
                LPARAM(&mut found as *mut Vec<HWND> as isize),
            )
        };
        if let Err(e) = result {
            warn!(error = %e, "EnumWindows failed");
            return Vec::new();
        }

        let windows: Vec<OsWindow> = found
            .into_iter()
            .filter_map(describe)
            .filter(|w| w.visible && w.class_name == class)
            .collect();
        debug!(class, count = windows.len(), "Enumerated windows");
        windows
    }

    fn inspect(&self, handle: WindowHandle) -> Option<OsWindow> {
        describe(to_hwnd(handle))
    }

    fn foreground(&self) -> Option<WindowHandle> {
        // SAFETY: no arguments.
        let hwnd = unsafe { GetForegroundWindow() };
        (!hwnd.0.is_null()).then(|| to_handle(hwnd))
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        // SAFETY: IsIconic accepts any handle value.
        unsafe { IsIconic(to_hwnd(handle)) }.as_bool()
    }

    fn restore(&self, handle: WindowHandle) -> bool {
        // SAFETY: ShowWindow accepts any handle value.
        unsafe { ShowWindow(to_hwnd(handle), SW_RESTORE) }.as_bool()
    }

    fn window_thread(&self, handle: WindowHandle) -> Option<ThreadId> {
        // SAFETY: the process id out-param is optional and omitted.
        let thread = unsafe { GetWindowThreadProcessId(to_hwnd(handle), None) };
        (thread != 0).then_some(thread)
    }

    fn current_thread(&self) -> ThreadId {
        // SAFETY: no arguments.
        unsafe { GetCurrentThreadId() }
    }

    fn attach_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> bool {
        // SAFETY: invalid thread ids make the call fail, nothing else.
        unsafe { AttachThreadInput(from, to, BOOL::from(attach)) }.as_bool()
    }

    fn bring_to_top(&self, handle: WindowHandle) -> bool {
        // SAFETY: BringWindowToTop accepts any handle value.
        unsafe { BringWindowToTop(to_hwnd(handle)) }.is_ok()
    }

    fn set_foreground(&self, handle: WindowHandle) -> bool {
        // SAFETY: SetForegroundWindow accepts any handle value.
        unsafe { SetForegroundWindow(to_hwnd(handle)) }.as_bool()
    }
}
