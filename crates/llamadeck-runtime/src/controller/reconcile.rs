//! Background reconciliation of the tracked process.
//!
//! Each tick re-derives the record from what the OS reports:
//!
//! - process exited: `Stopping` becomes `Stopped`, anything else `Failed`
//! - `Stopping` past the grace period: forced kill (once)
//! - `Starting` past `max_unready`: killed, `Failed(ReadinessTimeout)`
//! - `Starting` otherwise: readiness probe, run without holding the lock

use std::sync::Arc;

use llamadeck_core::ports::{ExitInfo, ProbeOutcome};
use llamadeck_core::{FailureReason, ProcessState, ServerRecord};
use tokio::time::{Instant, sleep, timeout};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{Inner, Shared};

/// Probe to run after the lock is released.
struct PendingProbe {
    generation: u64,
    pid: u32,
    address: String,
}

/// Run reconciliation ticks until `cancel` fires.
///
/// Ticks every `fast_poll_interval` while starting or stopping and every
/// `poll_interval` otherwise. `start`/`stop` wake the loop early.
pub(super) async fn run(shared: Arc<Shared>, cancel: CancellationToken) {
    debug!("Reconciliation loop started");

    loop {
        let period = if shared.snapshot.borrow().process_state.is_transitional() {
            shared.settings.fast_poll_interval()
        } else {
            shared.settings.poll_interval()
        };

        tokio::select! {
            () = cancel.cancelled() => break,
            () = shared.wake.notified() => {}
            () = sleep(period) => {}
        }

        shared.reconcile_once().await;
    }

    debug!("Reconciliation loop stopped");
}

impl Shared {
    /// One reconciliation tick.
    pub(super) async fn reconcile_once(&self) {
        let Some(pending) = self.observe().await else {
            return;
        };

        let probe_timeout = self.settings.probe_timeout();
        let outcome = timeout(
            probe_timeout,
            self.probe.probe(&pending.address, probe_timeout),
        )
        .await
        .unwrap_or_else(|_| ProbeOutcome::not_ready("probe timed out"));

        if let ProbeOutcome::NotReady { reason } = outcome {
            debug!(pid = %pending.pid, %reason, "Server not ready yet");
            return;
        }

        let mut inner = self.inner.lock().await;
        if inner.generation != pending.generation
            || inner.record.process_state != ProcessState::Starting
        {
            debug!(pid = %pending.pid, "Discarding stale readiness result");
            return;
        }

        let model = inner.model.clone().unwrap_or_default();
        inner.starting_since = None;
        self.transition(
            &mut inner,
            ServerRecord::running(pending.pid, pending.address, model),
        );
    }

    /// Liveness and deadline checks under the lock. Returns the probe to
    /// run, if the server is still starting.
    async fn observe(&self) -> Option<PendingProbe> {
        let mut guard = self.inner.lock().await;
        let inner = &mut *guard;
        let process = inner.process.as_mut()?;
        let pid = process.pid();

        match process.try_exit() {
            Ok(None) => {}
            Ok(Some(exit)) => {
                self.on_exit(inner, pid, exit);
                return None;
            }
            Err(e) => {
                warn!(pid = %pid, error = %e, "Lost track of server process");
                self.finish(
                    inner,
                    ServerRecord::failed(FailureReason::Lost {
                        message: e.to_string(),
                    }),
                );
                return None;
            }
        }

        match inner.record.process_state {
            ProcessState::Stopping => {
                self.escalate_if_overdue(inner, pid);
                None
            }
            ProcessState::Starting => {
                let waited = inner
                    .starting_since
                    .map(|since| since.elapsed())
                    .unwrap_or_default();
                if waited >= self.settings.max_unready() {
                    self.fail_unready(inner, pid, waited);
                    return None;
                }
                Some(PendingProbe {
                    generation: inner.generation,
                    pid,
                    address: inner.address.clone()?,
                })
            }
            _ => None,
        }
    }

    fn on_exit(&self, inner: &mut Inner, pid: u32, exit: ExitInfo) {
        let record = if inner.record.process_state == ProcessState::Stopping {
            info!(pid = %pid, "Server stopped");
            ServerRecord::stopped()
        } else {
            warn!(
                pid = %pid,
                code = ?exit.code,
                signal = ?exit.signal,
                "Server exited unexpectedly"
            );
            ServerRecord::failed(exit.into())
        };
        self.finish(inner, record);
    }

    fn escalate_if_overdue(&self, inner: &mut Inner, pid: u32) {
        if inner.force_killed {
            return;
        }
        let overdue = inner
            .stop_deadline
            .is_some_and(|deadline| Instant::now() >= deadline);
        if !overdue {
            return;
        }

        let Some(process) = inner.process.as_mut() else {
            return;
        };
        warn!(pid = %pid, grace = ?self.settings.stop_grace(), "Server ignored termination, killing");
        match process.kill() {
            Ok(()) => inner.force_killed = true,
            // Retried next tick
            Err(e) => warn!(pid = %pid, error = %e, "Failed to kill server"),
        }
    }

    fn fail_unready(&self, inner: &mut Inner, pid: u32, waited: std::time::Duration) {
        warn!(pid = %pid, waited = ?waited, "Server never became ready, killing");
        if let Some(process) = inner.process.as_mut() {
            if let Err(e) = process.kill() {
                warn!(pid = %pid, error = %e, "Failed to kill unready server");
            }
        }
        let waited_ms = u64::try_from(waited.as_millis()).unwrap_or(u64::MAX);
        self.finish(
            inner,
            ServerRecord::failed(FailureReason::ReadinessTimeout { waited_ms }),
        );
    }
}
