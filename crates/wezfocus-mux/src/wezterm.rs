//! WezTerm CLI integration.
//!
//! Provides:
//! - The [`Multiplexer`] port used by capture and resolve
//! - [`WezTermCli`], which shells out to `wezterm cli` under a timeout

use std::time::Duration;

use tracing::{debug, info};

use crate::error::MuxResult;
use crate::invoke::{Invocation, Invoker};
use crate::tab::{parse_tab_list, TabRecord};

/// Environment variable WezTerm sets to the pane a process runs in.
pub const PANE_ENV: &str = "WEZTERM_PANE";

/// Environment variable naming the mux server socket.
pub const SOCKET_ENV: &str = "WEZTERM_UNIX_SOCKET";

/// Default timeout for listing and tab activation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default timeout for pane activation on the cached-handle fast path.
const DEFAULT_PANE_TIMEOUT: Duration = Duration::from_secs(2);

// ============================================================================
// Port
// ============================================================================

/// Operations needed from the terminal multiplexer.
pub trait Multiplexer {
    /// Lists every pane of every tab of every window.
    fn list_tabs(&self) -> MuxResult<Vec<TabRecord>>;

    /// Makes `tab_id` the active tab of its window.
    fn activate_tab(&self, tab_id: u64) -> MuxResult<()>;

    /// Makes `pane_id` active, talking to the mux at `socket` if given.
    fn activate_pane(&self, pane_id: u64, socket: Option<&str>) -> MuxResult<()>;
}

// ============================================================================
// WezTerm CLI
// ============================================================================

/// [`Multiplexer`] backed by the `wezterm` executable.
#[derive(Debug, Clone)]
pub struct WezTermCli {
    program: String,
    invoker: Invoker,
    timeout: Duration,
    pane_timeout: Duration,
}

impl Default for WezTermCli {
    fn default() -> Self {
        Self::new("wezterm")
    }
}

impl WezTermCli {
    /// Creates a client for the given executable with default timeouts.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            invoker: Invoker::new(),
            timeout: DEFAULT_TIMEOUT,
            pane_timeout: DEFAULT_PANE_TIMEOUT,
        }
    }

    /// Replaces the invoker (poll interval, temp dir).
    #[must_use]
    pub fn with_invoker(mut self, invoker: Invoker) -> Self {
        self.invoker = invoker;
        self
    }

    /// Sets the timeout for listing and tab activation.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the shorter timeout used for pane activation.
    #[must_use]
    pub fn with_pane_timeout(mut self, timeout: Duration) -> Self {
        self.pane_timeout = timeout;
        self
    }

    fn cli<I, S>(&self, args: I) -> Invocation
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        Invocation::new(&self.program).args(["cli"]).args(args)
    }

    fn run_checked(&self, invocation: &Invocation, timeout: Duration) -> MuxResult<Vec<u8>> {
        let output = self
            .invoker
            .run(invocation, timeout)?
            .into_success(invocation)?;
        Ok(output.stdout)
    }
}

impl Multiplexer for WezTermCli {
    fn list_tabs(&self) -> MuxResult<Vec<TabRecord>> {
        let invocation = self.cli(["list", "--format", "json"]);
        let stdout = self.run_checked(&invocation, self.timeout)?;
        let tabs = parse_tab_list(&stdout)?;
        debug!(count = tabs.len(), "Listed wezterm panes");
        Ok(tabs)
    }

    fn activate_tab(&self, tab_id: u64) -> MuxResult<()> {
        let id = tab_id.to_string();
        let invocation = self.cli(["activate-tab", "--tab-id", id.as_str()]);
        self.run_checked(&invocation, self.timeout)?;
        info!(tab_id, "Activated wezterm tab");
        Ok(())
    }

    fn activate_pane(&self, pane_id: u64, socket: Option<&str>) -> MuxResult<()> {
        let id = pane_id.to_string();
        let mut invocation = self.cli(["activate-pane", "--pane-id", id.as_str()]);
        if let Some(socket) = socket.filter(|s| !s.is_empty()) {
            invocation = invocation.env(SOCKET_ENV, socket);
        }
        self.run_checked(&invocation, self.pane_timeout)?;
        info!(pane_id, "Activated wezterm pane");
        Ok(())
    }
}
