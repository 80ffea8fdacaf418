//! Server lifecycle events.
//!
//! Emitted by the controller on every transition of the managed server.
//! Consumers that only need the latest state should read the record
//! snapshot instead; events are for UIs and logs that want each step.

use serde::{Deserialize, Serialize};

use crate::domain::{FailureReason, ProcessState, ServerRecord};

/// Server state carried by each event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerStateInfo {
    /// Model being started, served or stopped (when known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Unix timestamp in milliseconds when this state was recorded.
    pub updated_at: u64,
}

/// Server lifecycle event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// Process spawned, waiting for readiness.
    Starting(ServerStateInfo),
    /// Server answered its readiness probe.
    Running(ServerStateInfo),
    /// Termination requested.
    Stopping(ServerStateInfo),
    /// Process gone after a requested stop.
    Stopped(ServerStateInfo),
    /// Process crashed, never became ready, or could not be spawned.
    Failed {
        #[serde(flatten)]
        info: ServerStateInfo,
        reason: FailureReason,
    },
}

impl ServerEvent {
    /// Build the event announcing that the server reached `record`.
    #[must_use]
    pub fn from_record(record: &ServerRecord, model: Option<&str>) -> Self {
        let info = ServerStateInfo {
            model: record
                .active_model
                .clone()
                .or_else(|| model.map(str::to_string)),
            pid: record.pid,
            address: record.bound_address.clone(),
            updated_at: record.updated_at,
        };

        match &record.process_state {
            ProcessState::Starting => Self::Starting(info),
            ProcessState::Running => Self::Running(info),
            ProcessState::Stopping => Self::Stopping(info),
            ProcessState::Stopped => Self::Stopped(info),
            ProcessState::Failed(reason) => Self::Failed {
                info,
                reason: reason.clone(),
            },
        }
    }

    /// Short event name, matching the serialized `type` tag.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Starting(_) => "starting",
            Self::Running(_) => "running",
            Self::Stopping(_) => "stopping",
            Self::Stopped(_) => "stopped",
            Self::Failed { .. } => "failed",
        }
    }
}
