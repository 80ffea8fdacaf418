//! A server left running by an earlier controller, tracked by PID only.
//!
//! There is no `Child` handle, so the process cannot be reaped or its exit
//! status read; exit is observed as the PID disappearing.

use std::io;

use llamadeck_core::ports::{ExitInfo, ManagedProcess};

use super::signal::{Termination, pid_exists, signal_pid};

pub struct AdoptedProcess {
    pid: u32,
}

impl AdoptedProcess {
    pub const fn new(pid: u32) -> Self {
        Self { pid }
    }
}

impl ManagedProcess for AdoptedProcess {
    fn pid(&self) -> u32 {
        self.pid
    }

    fn try_exit(&mut self) -> io::Result<Option<ExitInfo>> {
        if pid_exists(self.pid) {
            Ok(None)
        } else {
            Ok(Some(ExitInfo::unknown()))
        }
    }

    fn terminate(&mut self) -> io::Result<()> {
        signal_pid(self.pid, Termination::Graceful)
    }

    fn kill(&mut self) -> io::Result<()> {
        signal_pid(self.pid, Termination::Forceful)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(unix)]
    fn vanished_pid_reports_exit() {
        let mut process = AdoptedProcess::new(999_999);
        assert_eq!(process.try_exit().unwrap(), Some(ExitInfo::unknown()));
    }

    #[tokio::test]
    #[cfg(unix)]
    async fn terminate_ends_adopted_process() {
        let mut child = tokio::process::Command::new("sleep")
            .arg("30")
            .spawn()
            .expect("failed to spawn sleep");
        let pid = child.id().expect("no PID");

        let mut adopted = AdoptedProcess::new(pid);
        assert_eq!(adopted.try_exit().unwrap(), None);
        adopted.terminate().expect("terminate failed");

        // Reap it ourselves; an adopted process's parent is someone else.
        let _ = child.wait().await;
        assert_eq!(adopted.try_exit().unwrap(), Some(ExitInfo::unknown()));
    }
}
