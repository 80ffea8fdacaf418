//! A server process spawned by this controller.

use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitStatus;

use llamadeck_core::ports::{ExitInfo, ManagedProcess};
use tokio::process::Child;
use tracing::debug;

use super::stream::OutputTail;

/// Spawned llama-server with its `Child` handle and captured stderr tail.
pub struct ChildProcess {
    child: Child,
    pid: u32,
    binary: PathBuf,
    stderr_tail: OutputTail,
}

impl ChildProcess {
    pub const fn new(child: Child, pid: u32, binary: PathBuf, stderr_tail: OutputTail) -> Self {
        Self {
            child,
            pid,
            binary,
            stderr_tail,
        }
    }

    fn exit_info(&self, status: ExitStatus) -> ExitInfo {
        #[cfg(unix)]
        let signal = {
            use std::os::unix::process::ExitStatusExt;
            status.signal()
        };
        #[cfg(not(unix))]
        let signal = None;

        ExitInfo {
            code: status.code(),
            signal,
            stderr_tail: self.stderr_tail.snapshot(),
        }
    }
}

impl ManagedProcess for ChildProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_exit(&mut self) -> io::Result<Option<ExitInfo>> {
        let status = self.child.try_wait()?;
        Ok(status.map(|status| {
            debug!(pid = %self.pid, ?status, "Process exited");
            self.exit_info(status)
        }))
    }

    #[cfg(unix)]
    fn terminate(&mut self) -> io::Result<()> {
        super::signal::signal_pid(self.pid, super::signal::Termination::Graceful)
    }

    // No SIGTERM equivalent; terminate immediately.
    #[cfg(not(unix))]
    fn terminate(&mut self) -> io::Result<()> {
        self.kill()
    }

    fn kill(&mut self) -> io::Result<()> {
        match self.child.start_kill() {
            // Already reaped.
            Err(e) if e.kind() == io::ErrorKind::InvalidInput => Ok(()),
            other => other,
        }
    }

    fn executable(&self) -> Option<&Path> {
        Some(&self.binary)
    }
}
