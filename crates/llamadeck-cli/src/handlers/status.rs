//! Status command handler.

use anyhow::Result;
use llamadeck_core::ProcessState;

use crate::bootstrap::CliContext;
use crate::presentation::describe_record;

/// Report the server recorded in the state file, if it is still alive.
pub async fn execute(ctx: &CliContext, json: bool) -> Result<()> {
    if ctx.controller.recover().await.is_some() {
        // Give the readiness probe a chance to confirm the adopted server.
        let mut updates = ctx.controller.subscribe();
        let wait = ctx.controller.settings().probe_timeout() * 2;
        let _ = tokio::time::timeout(
            wait,
            updates.wait_for(|r| r.process_state != ProcessState::Starting),
        )
        .await;
    }

    let record = ctx.controller.status();
    if json {
        println!("{}", serde_json::to_string_pretty(&record)?);
    } else {
        println!("{}", describe_record(&record));
    }
    Ok(())
}
