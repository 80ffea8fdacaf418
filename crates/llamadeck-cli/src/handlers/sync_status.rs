//! Sync-status command handler.
//!
//! Shows what a sync indicator displays for a given set of signals.

use anyhow::Result;
use llamadeck_core::{StatusAction, SyncPhase, SyncSignals};

/// Render the synthesized status for the given signals.
pub fn render(signals: SyncSignals) -> String {
    let state = signals.display_state();
    let mut out = format!("{} ({:?})", state.label(), state.severity);
    match state.action() {
        Some(StatusAction::Retry) => out.push_str("\nAction: retry sync"),
        Some(StatusAction::SyncNow) => out.push_str("\nAction: sync now"),
        None => {}
    }
    out
}

pub fn execute(online: bool, phase: SyncPhase, pending: u64, json: bool) -> Result<()> {
    let signals = SyncSignals::new(online, phase, pending);
    if json {
        println!("{}", serde_json::to_string_pretty(&signals.display_state())?);
    } else {
        println!("{}", render(signals));
    }
    Ok(())
}
