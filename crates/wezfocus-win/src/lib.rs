//! Window-manager access for wezfocus.
//!
//! [`WindowManager`] is the narrow port over the OS window manager: window
//! enumeration, inspection, and the handful of calls foreground transfer
//! needs. [`focus::bring_to_foreground`] implements the transfer on top of
//! it, so the attach/detach discipline is platform independent and tested
//! against [`testing::FakeWindowManager`].
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod focus;
pub mod port;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
#[cfg(windows)]
pub mod win32;

pub use focus::{bring_to_foreground, is_valid_target, FocusReport};
pub use port::{platform_window_manager, OsWindow, ThreadId, UnsupportedWindowManager, WindowManager};
