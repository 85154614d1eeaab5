//! wezfocus core - shared types for notification focus restoration
//!
//! This crate provides the domain types shared between the capture side
//! (run when a notification fires) and the resolve side (run when the
//! notification is clicked).
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod cache;
pub mod cwd;
pub mod error;
pub mod snapshot;
pub mod title;

// Re-exports for convenience
pub use cache::CacheStore;
pub use cwd::{normalize_mux_cwd, normalize_project_dir, same_directory};
pub use error::{CacheError, CacheResult};
pub use snapshot::{SessionSnapshot, WindowHandle};
pub use title::{TitleHeuristics, DEFAULT_AUXILIARY_TITLES, DEFAULT_TITLE_MARKERS};
