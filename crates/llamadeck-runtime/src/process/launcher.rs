//! `tokio::process` implementation of the process launcher port.

use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use llamadeck_core::ports::{LaunchSpec, ManagedProcess, ProcessLauncher};
use tokio::process::Command;
use tracing::{debug, info};

use super::adopted::AdoptedProcess;
use super::child::ChildProcess;
use super::stream::{OutputTail, spawn_stream_reader};
use super::verify::is_llama_server;
use crate::binary::resolve_llama_server;

/// Launches llama-server processes.
///
/// The binary is resolved on every launch so installing llama.cpp while the
/// controller is up takes effect without a restart.
#[derive(Debug, Clone, Default)]
pub struct LlamaServerLauncher {
    /// Explicit binary path; `None` searches well-known locations.
    binary: Option<PathBuf>,
}

impl LlamaServerLauncher {
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self { binary }
    }

    fn build_command(binary: &Path, spec: &LaunchSpec) -> Command {
        let mut cmd = Command::new(binary);
        cmd.arg("--model")
            .arg(&spec.model_path)
            .arg("--host")
            .arg(&spec.host)
            .arg("--port")
            .arg(spec.port.to_string());

        if let Some(ctx) = spec.context_size {
            cmd.arg("-c").arg(ctx.to_string());
        }

        cmd.args(&spec.extra_args);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }
}

#[async_trait]
impl ProcessLauncher for LlamaServerLauncher {
    async fn launch(&self, spec: &LaunchSpec) -> io::Result<Box<dyn ManagedProcess>> {
        let binary = resolve_llama_server(self.binary.as_deref())
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e.to_string()))?;

        if !spec.model_path.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Model file not found: {}", spec.model_path.display()),
            ));
        }

        debug!(binary = %binary.display(), model = %spec.model_name, "Spawning llama-server");
        let mut child = Self::build_command(&binary, spec).spawn()?;
        let pid = child
            .id()
            .ok_or_else(|| io::Error::other("spawned process has no PID"))?;

        let stderr_tail = OutputTail::new();
        if let Some(stdout) = child.stdout.take() {
            spawn_stream_reader(stdout, pid, "stdout", None);
        }
        if let Some(stderr) = child.stderr.take() {
            spawn_stream_reader(stderr, pid, "stderr", Some(stderr_tail.clone()));
        }

        info!(pid = %pid, address = %spec.address(), model = %spec.model_name, "llama-server spawned");
        // Absolute, so a later controller in another directory can verify it.
        let binary = binary.canonicalize().unwrap_or(binary);
        Ok(Box::new(ChildProcess::new(child, pid, binary, stderr_tail)))
    }

    // Verified against the recorded binary, not `self.binary`: the server may
    // have been launched with a different `--llama-server` than this one.
    fn adopt(&self, pid: u32, executable: Option<&Path>) -> Option<Box<dyn ManagedProcess>> {
        if is_llama_server(pid, executable) {
            Some(Box::new(AdoptedProcess::new(pid)))
        } else {
            None
        }
    }
}
