//! WezTerm multiplexer access for wezfocus.
//!
//! The `wezterm` CLI is not trusted to return promptly, so every call goes
//! through [`Invoker`], which bounds wall-clock time and kills the child on
//! timeout. [`Multiplexer`] is the port the capture and resolve stages
//! depend on; [`WezTermCli`] implements it.

pub mod error;
pub mod invoke;
pub mod tab;
pub mod wezterm;

pub use error::{MuxError, MuxResult};
pub use invoke::{CommandOutput, Invocation, Invoker, DEFAULT_POLL_INTERVAL};
pub use tab::{parse_tab_list, TabRecord};
pub use wezterm::{Multiplexer, WezTermCli, PANE_ENV, SOCKET_ENV};
