//! Process launcher port.
//!
//! Abstracts spawning and signalling the inference server so the controller
//! can be driven by a fake in tests and by `tokio::process` in production.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::FailureReason;

/// Everything needed to launch one server process.
///
/// Locating the server binary is left to the launcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Catalog name of the model being served.
    pub model_name: String,
    /// Path to the model file.
    pub model_path: PathBuf,
    /// Interface to bind.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Context size to use (if None, use model default).
    pub context_size: Option<u64>,
    /// Additional server-specific arguments.
    pub extra_args: Vec<String>,
}

impl LaunchSpec {
    /// Create a launch spec with required fields.
    pub fn new(
        model_name: impl Into<String>,
        model_path: impl Into<PathBuf>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            model_name: model_name.into(),
            model_path: model_path.into(),
            host: host.into(),
            port,
            context_size: None,
            extra_args: Vec::new(),
        }
    }

    /// Set the context size.
    #[must_use]
    pub const fn with_context_size(mut self, size: u64) -> Self {
        self.context_size = Some(size);
        self
    }

    /// Add extra arguments to pass to the server.
    #[must_use]
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// `host:port` the server will listen on.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// How a process ended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExitInfo {
    pub code: Option<i32>,
    pub signal: Option<i32>,
    /// Last lines the process wrote to stderr, if captured.
    pub stderr_tail: Option<String>,
}

impl ExitInfo {
    #[must_use]
    pub const fn with_code(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
            stderr_tail: None,
        }
    }

    /// Exit of a process we could only observe disappearing.
    #[must_use]
    pub const fn unknown() -> Self {
        Self {
            code: None,
            signal: None,
            stderr_tail: None,
        }
    }
}

impl From<ExitInfo> for FailureReason {
    fn from(exit: ExitInfo) -> Self {
        Self::Exited {
            code: exit.code,
            signal: exit.signal,
            detail: exit.stderr_tail,
        }
    }
}

/// A launched server process.
///
/// All methods are non-blocking; waiting is the reconciliation loop's job.
pub trait ManagedProcess: Send {
    /// OS process id.
    fn pid(&self) -> u32;

    /// `Ok(Some(_))` once the process has exited, `Ok(None)` while alive.
    fn try_exit(&mut self) -> io::Result<Option<ExitInfo>>;

    /// Ask the process to shut down gracefully (SIGTERM on Unix).
    fn terminate(&mut self) -> io::Result<()>;

    /// Force the process to stop (SIGKILL on Unix).
    fn kill(&mut self) -> io::Result<()>;

    /// Executable the process was started from, when known.
    fn executable(&self) -> Option<&Path> {
        None
    }
}

/// Spawns server processes.
#[async_trait]
pub trait ProcessLauncher: Send + Sync {
    /// Spawn the server described by `spec`.
    ///
    /// Returns as soon as the OS has created the process; readiness is not
    /// awaited.
    async fn launch(&self, spec: &LaunchSpec) -> io::Result<Box<dyn ManagedProcess>>;

    /// Take over a server left running by an earlier controller.
    ///
    /// `executable` is the binary recorded when the server was launched.
    /// Returns `None` unless `pid` is alive and verified to be that server,
    /// whatever binary this launcher is currently configured with.
    fn adopt(&self, pid: u32, executable: Option<&Path>) -> Option<Box<dyn ManagedProcess>> {
        let _ = (pid, executable);
        None
    }
}
