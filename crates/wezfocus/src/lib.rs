//! wezfocus - focus the WezTerm tab that raised a notification.
//!
//! Two stages run in separate processes:
//! - [`capture`] runs when a notification fires and writes a
//!   [`SessionSnapshot`](wezfocus_core::SessionSnapshot) to the cache
//! - [`resolver`] runs when the notification is clicked, reads the snapshot
//!   back and brings the matching window to the foreground
//!
//! **Panic-Free Policy:** no `.unwrap()`, `.expect()`, `panic!()`,
//! `unreachable!()`, or `todo!()` outside tests.

pub mod capture;
pub mod config;
pub mod error;
pub mod hook;
pub mod logging;
pub mod resolver;
pub mod setup;

pub use capture::{capture_and_store, capture_snapshot, CaptureContext, CaptureSettings, TabCountMatch};
pub use config::Config;
pub use error::{ConfigError, ResolveError};
pub use resolver::{restore_focus, FocusOutcome, Resolution, Resolver, ResolverSettings};
