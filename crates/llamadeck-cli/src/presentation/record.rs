//! Human-readable server status.

use llamadeck_core::{ProcessState, ServerRecord};

/// One-line description of a lifecycle state.
pub fn describe_state(state: &ProcessState) -> String {
    match state {
        ProcessState::Stopped => "Stopped".to_string(),
        ProcessState::Starting => "Starting (loading model)".to_string(),
        ProcessState::Running => "Running".to_string(),
        ProcessState::Stopping => "Stopping".to_string(),
        ProcessState::Failed(reason) => format!("Failed: {reason}"),
    }
}

/// Multi-line description of a record, as printed by `status`.
pub fn describe_record(record: &ServerRecord) -> String {
    let mut lines = vec![format!("Server: {}", describe_state(&record.process_state))];
    if let Some(model) = &record.active_model {
        lines.push(format!("Model:  {model}"));
    }
    if let Some(address) = &record.bound_address {
        lines.push(format!("URL:    http://{address}"));
    }
    if let Some(pid) = record.pid {
        lines.push(format!("PID:    {pid}"));
    }
    lines.join("\n")
}
