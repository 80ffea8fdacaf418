//! Lifecycle record of the managed inference server.
//!
//! A [`ServerRecord`] is only ever built through its constructors, which keep
//! the field invariants:
//!
//! - `pid` is present iff the state is `Starting`, `Running` or `Stopping`
//! - `active_model` is present iff the state is `Running`
//! - `bound_address` is present once `Running` (and kept while `Stopping`)

use std::fmt;

use serde::{Deserialize, Serialize};

/// Why the server ended up in [`ProcessState::Failed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum FailureReason {
    /// The process exited without being asked to.
    #[serde(rename_all = "camelCase")]
    Exited {
        code: Option<i32>,
        signal: Option<i32>,
        /// Tail of the process's stderr, when it was captured.
        detail: Option<String>,
    },
    /// The process stayed alive but never answered the readiness probe.
    #[serde(rename_all = "camelCase")]
    ReadinessTimeout { waited_ms: u64 },
    /// The spawn call itself failed or timed out.
    SpawnFailed { message: String },
    /// Liveness of the process could no longer be determined.
    Lost { message: String },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exited {
                code,
                signal,
                detail,
            } => {
                match (code, signal) {
                    (Some(code), _) => write!(f, "exited with code {code}")?,
                    (None, Some(signal)) => write!(f, "killed by signal {signal}")?,
                    (None, None) => write!(f, "exited")?,
                }
                if let Some(detail) = detail {
                    write!(f, ": {detail}")?;
                }
                Ok(())
            }
            Self::ReadinessTimeout { waited_ms } => {
                write!(f, "not ready after {}s", waited_ms / 1000)
            }
            Self::SpawnFailed { message } => write!(f, "failed to spawn: {message}"),
            Self::Lost { message } => write!(f, "process lost: {message}"),
        }
    }
}

/// Lifecycle state of the managed server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason", rename_all = "lowercase")]
pub enum ProcessState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed(FailureReason),
}

impl ProcessState {
    /// States from which `start` is accepted.
    #[must_use]
    pub const fn can_start(&self) -> bool {
        matches!(self, Self::Stopped | Self::Failed(_))
    }

    /// States with a live process attached.
    #[must_use]
    pub const fn has_process(&self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::Stopping)
    }

    /// States the reconciliation loop is actively driving towards another.
    #[must_use]
    pub const fn is_transitional(&self) -> bool {
        matches!(self, Self::Starting | Self::Stopping)
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Stopping => "stopping",
            Self::Failed(_) => "failed",
        }
    }
}

impl fmt::Display for ProcessState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(reason) => write!(f, "failed ({reason})"),
            other => f.write_str(other.name()),
        }
    }
}

/// Snapshot of the managed server as last reconciled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerRecord {
    pub process_state: ProcessState,
    pub pid: Option<u32>,
    pub bound_address: Option<String>,
    pub active_model: Option<String>,
    /// Unix timestamp in milliseconds of the last transition.
    pub updated_at: u64,
}

impl ServerRecord {
    fn build(
        process_state: ProcessState,
        pid: Option<u32>,
        bound_address: Option<String>,
        active_model: Option<String>,
    ) -> Self {
        Self {
            process_state,
            pid,
            bound_address,
            active_model,
            updated_at: now_ms(),
        }
    }

    #[must_use]
    pub fn stopped() -> Self {
        Self::build(ProcessState::Stopped, None, None, None)
    }

    #[must_use]
    pub fn starting(pid: u32) -> Self {
        Self::build(ProcessState::Starting, Some(pid), None, None)
    }

    pub fn running(pid: u32, bound_address: impl Into<String>, model: impl Into<String>) -> Self {
        Self::build(
            ProcessState::Running,
            Some(pid),
            Some(bound_address.into()),
            Some(model.into()),
        )
    }

    #[must_use]
    pub fn stopping(pid: u32, bound_address: Option<String>) -> Self {
        Self::build(ProcessState::Stopping, Some(pid), bound_address, None)
    }

    #[must_use]
    pub fn failed(reason: FailureReason) -> Self {
        Self::build(ProcessState::Failed(reason), None, None, None)
    }

    #[must_use]
    pub const fn state(&self) -> &ProcessState {
        &self.process_state
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self.process_state, ProcessState::Running)
    }

    /// The failure reason, if the record is `Failed`.
    #[must_use]
    pub const fn failure(&self) -> Option<&FailureReason> {
        match &self.process_state {
            ProcessState::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

impl Default for ServerRecord {
    fn default() -> Self {
        Self::stopped()
    }
}

fn now_ms() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or_default()
}
