//! Subprocess execution with a hard wall-clock timeout.
//!
//! stdout and stderr are redirected to temp files instead of pipes, so a
//! child that writes more than a pipe buffer can hold never blocks while
//! we wait on it. Liveness is polled on a fixed interval; once the timeout
//! passes the child is killed and reaped.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - The child is killed on every early exit path via [`ChildGuard`]
//! - Temp files are removed on drop, timeout included

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use tracing::{debug, trace, warn};

use crate::error::{MuxError, MuxResult};

/// Default interval between liveness checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Suppresses the console window a GUI-launched process would otherwise flash.
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

// ============================================================================
// Invocation
// ============================================================================

/// A command line plus environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
    envs: Vec<(OsString, OsString)>,
}

impl Invocation {
    /// Starts building an invocation of `program`.
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            envs: Vec::new(),
        }
    }

    /// Appends arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Sets an environment variable for the child only.
    #[must_use]
    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    /// Program name as a display string.
    pub fn program(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Environment overrides.
    pub fn envs(&self) -> &[(OsString, OsString)] {
        &self.envs
    }

    /// Arguments.
    pub fn arguments(&self) -> &[OsString] {
        &self.args
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

// ============================================================================
// Output
// ============================================================================

/// Everything a finished child produced.
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    /// Returns `self` if the exit status was success, otherwise
    /// `MuxError::CommandFailed` carrying stderr.
    pub fn into_success(self, invocation: &Invocation) -> MuxResult<Self> {
        if self.status.success() {
            return Ok(self);
        }
        Err(MuxError::CommandFailed {
            command: invocation.to_string(),
            status: self.status.to_string(),
            stderr: String::from_utf8_lossy(&self.stderr).trim().to_string(),
        })
    }
}

// ============================================================================
// Invoker
// ============================================================================

/// Runs commands with a bounded wall-clock time.
#[derive(Debug, Clone)]
pub struct Invoker {
    poll_interval: Duration,
    temp_dir: Option<PathBuf>,
}

impl Default for Invoker {
    fn default() -> Self {
        Self::new()
    }
}

impl Invoker {
    /// Creates an invoker with the default poll interval and the system
    /// temp directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            temp_dir: None,
        }
    }

    /// Sets the liveness poll interval.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Places output capture files in `dir` instead of the system temp dir.
    #[must_use]
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Runs the invocation to completion or until `timeout` elapses.
    ///
    /// A non-zero exit is *not* an error here; see
    /// [`CommandOutput::into_success`].
    ///
    /// # Errors
    ///
    /// * `MuxError::NotFound` - the program does not exist
    /// * `MuxError::Spawn` - the program could not be started
    /// * `MuxError::Timeout` - the child was still running at the deadline
    /// * `MuxError::Io` - capture files could not be created or read
    pub fn run(&self, invocation: &Invocation, timeout: Duration) -> MuxResult<CommandOutput> {
        let stdout_file = self.capture_file()?;
        let stderr_file = self.capture_file()?;

        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(invocation.envs.iter().map(|(k, v)| (k, v)))
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout_file.reopen()?))
            .stderr(Stdio::from(stderr_file.reopen()?));

        #[cfg(windows)]
        {
            use std::os::windows::process::CommandExt;
            command.creation_flags(CREATE_NO_WINDOW);
        }

        let program = invocation.program();
        let child = command.spawn().map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                MuxError::NotFound {
                    program: program.clone(),
                }
            } else {
                MuxError::Spawn {
                    program: program.clone(),
                    source,
                }
            }
        })?;
        // Closes our copies of the capture handles.
        drop(command);

        let mut guard = ChildGuard::new(child, program);
        trace!(command = %invocation, ?timeout, "Spawned");

        let status = self.wait_with_deadline(&mut guard, timeout).map_err(|e| {
            if e.is_timeout() {
                warn!(command = %invocation, ?timeout, "Command timed out, killed");
            }
            e
        })?;

        let stdout = fs::read(stdout_file.path())?;
        let stderr = fs::read(stderr_file.path())?;
        debug!(
            command = %invocation,
            %status,
            stdout_len = stdout.len(),
            stderr_len = stderr.len(),
            "Command finished"
        );

        Ok(CommandOutput {
            status,
            stdout,
            stderr,
        })
    }

    fn wait_with_deadline(&self, guard: &mut ChildGuard, timeout: Duration) -> MuxResult<ExitStatus> {
        let started = Instant::now();
        loop {
            if let Some(status) = guard.try_wait()? {
                return Ok(status);
            }

            let elapsed = started.elapsed();
            if elapsed >= timeout {
                guard.kill();
                return Err(MuxError::Timeout {
                    program: guard.program(),
                    timeout,
                });
            }

            thread::sleep(self.poll_interval.min(timeout - elapsed));
        }
    }

    fn capture_file(&self) -> MuxResult<NamedTempFile> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("wezfocus-").suffix(".out");
            b
        };
        let file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        Ok(file)
    }
}

// ============================================================================
// Child Guard
// ============================================================================

/// Kills and reaps the child if it is still running when dropped.
struct ChildGuard {
    child: Child,
    program: String,
    reaped: bool,
}

impl ChildGuard {
    fn new(child: Child, program: String) -> Self {
        Self {
            child,
            program,
            reaped: false,
        }
    }

    fn program(&self) -> String {
        self.program.clone()
    }

    fn try_wait(&mut self) -> io::Result<Option<ExitStatus>> {
        let status = self.child.try_wait()?;
        if status.is_some() {
            self.reaped = true;
        }
        Ok(status)
    }

    fn kill(&mut self) {
        if self.reaped {
            return;
        }
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "kill failed, child may have exited");
        }
        if let Err(e) = self.child.wait() {
            debug!(error = %e, "wait after kill failed");
        }
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

// ============================================================================
// Tests
// ============================================================================
