//! Process verification to ensure a PID still belongs to llama-server.
//!
//! PIDs get reused, so a pid read back from the state file is only trusted
//! after the process behind it has been inspected.

use std::path::Path;

use sysinfo::{Pid, ProcessStatus, ProcessesToUpdate, System};

/// Check if `pid` is a live llama-server process.
///
/// When `expected_binary` and the process executable both resolve on disk
/// they must be the same file. Otherwise (no recorded binary, or it was
/// replaced since launch) the process name decides.
pub fn is_llama_server(pid: u32, expected_binary: Option<&Path>) -> bool {
    let target = Pid::from_u32(pid);
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[target]), true);

    let Some(process) = system.process(target) else {
        return false;
    };

    if matches!(process.status(), ProcessStatus::Zombie | ProcessStatus::Dead) {
        return false;
    }

    if let (Some(expected), Some(actual)) = (
        expected_binary.and_then(|p| p.canonicalize().ok()),
        process.exe().and_then(|p| p.canonicalize().ok()),
    ) {
        return actual == expected;
    }

    // The kernel truncates process names to 15 bytes.
    let name = process.name().to_string_lossy();
    name.contains("llama-server") || name.starts_with("llama-cpp-serve")
}
