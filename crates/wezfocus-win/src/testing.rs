//! In-memory window manager for tests.

use std::cell::RefCell;

use wezfocus_core::WindowHandle;

use crate::port::{OsWindow, ThreadId, WindowManager};

/// A scripted window.
#[derive(Debug, Clone)]
pub struct FakeWindow {
    os: OsWindow,
    thread: ThreadId,
    minimized: bool,
}

impl FakeWindow {
    /// A visible, non-minimized window owned by thread 100.
    pub fn new(raw: i64, title: &str, class_name: &str) -> Self {
        Self {
            os: OsWindow {
                handle: WindowHandle::new(raw),
                title: title.to_string(),
                visible: true,
                class_name: class_name.to_string(),
            },
            thread: 100,
            minimized: false,
        }
    }

    #[must_use]
    pub fn thread(mut self, thread: ThreadId) -> Self {
        self.thread = thread;
        self
    }

    #[must_use]
    pub fn minimized(mut self) -> Self {
        self.minimized = true;
        self
    }

    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.os.visible = false;
        self
    }
}

#[derive(Debug, Default)]
struct State {
    windows: Vec<FakeWindow>,
    foreground: Option<WindowHandle>,
    deny_foreground: bool,
    attachments: Vec<(ThreadId, ThreadId)>,
    max_attachments: usize,
    enumerations: usize,
}

/// Window manager backed by a list of [`FakeWindow`]s.
#[derive(Debug)]
pub struct FakeWindowManager {
    current_thread: ThreadId,
    state: RefCell<State>,
}

impl FakeWindowManager {
    /// Creates an empty desktop; the caller runs on `current_thread`.
    pub fn new(current_thread: ThreadId) -> Self {
        Self {
            current_thread,
            state: RefCell::new(State::default()),
        }
    }

    pub fn add(&self, window: FakeWindow) {
        self.state.borrow_mut().windows.push(window);
    }

    /// Closes a window.
    pub fn remove(&self, raw: i64) {
        let handle = WindowHandle::new(raw);
        self.state
            .borrow_mut()
            .windows
            .retain(|w| w.os.handle != handle);
    }

    pub fn set_current_foreground(&self, handle: Option<WindowHandle>) {
        self.state.borrow_mut().foreground = handle;
    }

    /// Makes `set_foreground` fail as if focus-stealing prevention kicked in.
    pub fn deny_foreground(&self, deny: bool) {
        self.state.borrow_mut().deny_foreground = deny;
    }

    pub fn active_attachments(&self) -> Vec<(ThreadId, ThreadId)> {
        self.state.borrow().attachments.clone()
    }

    /// Highest number of simultaneous attachments seen.
    pub fn max_attachments(&self) -> usize {
        self.state.borrow().max_attachments
    }

    /// Number of `enumerate` calls made.
    pub fn enumerations(&self) -> usize {
        self.state.borrow().enumerations
    }

    fn find<T>(&self, handle: WindowHandle, f: impl FnOnce(&FakeWindow) -> T) -> Option<T> {
        self.state
            .borrow()
            .windows
            .iter()
            .find(|w| w.os.handle == handle)
            .map(f)
    }
}

impl WindowManager for FakeWindowManager {
    fn enumerate(&self, class_name: &str) -> Vec<OsWindow> {
        let mut state = self.state.borrow_mut();
        state.enumerations += 1;
        state
            .windows
            .iter()
            .filter(|w| w.os.visible && w.os.class_name == class_name)
            .map(|w| w.os.clone())
            .collect()
    }

    fn inspect(&self, handle: WindowHandle) -> Option<OsWindow> {
        self.find(handle, |w| w.os.clone())
    }

    fn foreground(&self) -> Option<WindowHandle> {
        self.state.borrow().foreground
    }

    fn is_minimized(&self, handle: WindowHandle) -> bool {
        self.find(handle, |w| w.minimized).unwrap_or(false)
    }

    fn restore(&self, handle: WindowHandle) -> bool {
        let mut state = self.state.borrow_mut();
        match state.windows.iter_mut().find(|w| w.os.handle == handle) {
            Some(window) => {
                window.minimized = false;
                true
            }
            None => false,
        }
    }

    fn window_thread(&self, handle: WindowHandle) -> Option<ThreadId> {
        self.find(handle, |w| w.thread)
    }

    fn current_thread(&self) -> ThreadId {
        self.current_thread
    }

    fn attach_input(&self, from: ThreadId, to: ThreadId, attach: bool) -> bool {
        let mut state = self.state.borrow_mut();
        if attach {
            state.attachments.push((from, to));
            state.max_attachments = state.max_attachments.max(state.attachments.len());
            true
        } else {
            let before = state.attachments.len();
            state.attachments.retain(|pair| *pair != (from, to));
            state.attachments.len() != before
        }
    }

    fn bring_to_top(&self, handle: WindowHandle) -> bool {
        self.find(handle, |_| ()).is_some()
    }

    fn set_foreground(&self, handle: WindowHandle) -> bool {
        let exists = self.find(handle, |_| ()).is_some();
        let mut state = self.state.borrow_mut();
        if state.deny_foreground || !exists {
            return false;
        }
        state.foreground = Some(handle);
        true
    }
}
