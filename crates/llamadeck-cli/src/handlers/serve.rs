//! Serve command handler.
//!
//! Runs llama-server in the foreground: starts it, reports when it is ready,
//! and stops it on Ctrl-C.

use anyhow::{Result, bail};
use llamadeck_core::ports::StartError;
use llamadeck_core::{FailureReason, ProcessState, ServerRecord};
use tracing::debug;

use crate::bootstrap::CliContext;
use crate::handlers::models::print_available;

const SIGTERM: i32 = 15;

/// What the foreground loop should do after a state change.
#[derive(Debug, PartialEq, Eq)]
enum Next {
    Continue,
    /// The server went away cleanly (e.g. `llamadeck stop` from elsewhere).
    Done,
    Fail(String),
}

fn next_step(record: &ServerRecord) -> Next {
    match &record.process_state {
        ProcessState::Stopped => Next::Done,
        ProcessState::Failed(FailureReason::Exited {
            signal: Some(SIGTERM),
            ..
        }) => Next::Done,
        ProcessState::Failed(reason) => Next::Fail(reason.to_string()),
        ProcessState::Starting | ProcessState::Running | ProcessState::Stopping => Next::Continue,
    }
}

/// Execute the serve command.
pub async fn execute(ctx: &CliContext, model: &str) -> Result<()> {
    if let Some(pid) = ctx.controller.recover().await {
        bail!("llama-server is already running (PID {pid}). Run 'llamadeck stop' first.");
    }

    let models = ctx.controller.list_models().await?;
    match ctx.controller.start(model).await {
        Ok(()) => {}
        Err(e @ StartError::UnknownModel(_)) => {
            print_available(&models);
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    }

    let status = ctx.controller.status();
    println!(
        "Starting llama-server with {model} (PID {})...",
        status.pid.unwrap_or_default()
    );

    let mut updates = ctx.controller.subscribe();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            result = &mut ctrl_c => {
                if let Err(e) = result {
                    debug!(error = %e, "Failed to listen for Ctrl-C");
                }
                println!("\nStopping llama-server...");
                ctx.controller.shutdown().await;
                println!("Stopped.");
                return Ok(());
            }
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(());
                }
                let record = updates.borrow_and_update().clone();
                if record.is_running() {
                    if let Some(address) = &record.bound_address {
                        println!("Ready at http://{address} (Ctrl-C to stop)");
                    }
                }
                match next_step(&record) {
                    Next::Continue => {}
                    Next::Done => {
                        println!("llama-server stopped.");
                        return Ok(());
                    }
                    Next::Fail(reason) => {
                        ctx.controller.shutdown().await;
                        bail!("llama-server failed: {reason}");
                    }
                }
            }
        }
    }
}
