//! Stop command handler.

use anyhow::{Result, bail};

use crate::bootstrap::CliContext;

/// Stop the server recorded in the state file.
pub async fn execute(ctx: &CliContext) -> Result<()> {
    let Some(pid) = ctx.controller.recover().await else {
        println!("No llama-server is running.");
        return Ok(());
    };

    println!("Stopping llama-server (PID {pid})...");
    ctx.controller.shutdown().await;

    if ctx.controller.status().process_state.has_process() {
        bail!("llama-server (PID {pid}) did not exit");
    }
    println!("Stopped.");
    Ok(())
}
