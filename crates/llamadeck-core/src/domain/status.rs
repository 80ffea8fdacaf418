//! Sync status synthesis.
//!
//! Reduces the independent signals reported by the sync engine and the
//! network detector into the single status a user sees. The reduction is a
//! pure function: no I/O, no hidden state, safe to call from anywhere.
//!
//! # Priority
//!
//! The first matching rule wins:
//!
//! 1. offline → [`DisplayKind::Offline`]
//! 2. sync in flight → [`DisplayKind::Syncing`]
//! 3. last sync failed → [`DisplayKind::SyncError`]
//! 4. local changes waiting → [`DisplayKind::PendingChanges`]
//! 5. otherwise → [`DisplayKind::Synced`]

use serde::{Deserialize, Serialize};

/// Phase reported by the sync engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    /// No sync running and the last one (if any) succeeded.
    #[default]
    Idle,
    /// A sync is currently in flight.
    Syncing,
    /// The last sync attempt failed.
    Error,
}

/// Which status is displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "count", rename_all = "camelCase")]
pub enum DisplayKind {
    Offline,
    Syncing,
    SyncError,
    PendingChanges(u64),
    Synced,
}

/// Styling hint. Carries no behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Neutral,
    Info,
    Warning,
    Error,
}

/// Action a status offers to the user.
///
/// Performing it (asking the sync engine to run) is up to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusAction {
    /// Retry after a failed sync.
    Retry,
    /// Push pending changes now instead of waiting.
    SyncNow,
}

/// The synthesized, user-facing status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayState {
    pub kind: DisplayKind,
    pub severity: Severity,
    pub actionable: bool,
}

impl DisplayState {
    const fn new(kind: DisplayKind, severity: Severity, actionable: bool) -> Self {
        Self {
            kind,
            severity,
            actionable,
        }
    }

    /// The action offered in this state, if any.
    ///
    /// Always `Some` exactly when [`DisplayState::actionable`] is set.
    #[must_use]
    pub const fn action(&self) -> Option<StatusAction> {
        match self.kind {
            DisplayKind::SyncError => Some(StatusAction::Retry),
            DisplayKind::PendingChanges(_) => Some(StatusAction::SyncNow),
            DisplayKind::Offline | DisplayKind::Syncing | DisplayKind::Synced => None,
        }
    }

    /// Short text for the status indicator.
    #[must_use]
    pub fn label(&self) -> String {
        match self.kind {
            DisplayKind::Offline => "Offline".to_string(),
            DisplayKind::Syncing => "Syncing…".to_string(),
            DisplayKind::SyncError => "Sync failed".to_string(),
            DisplayKind::PendingChanges(1) => "1 change pending".to_string(),
            DisplayKind::PendingChanges(n) => format!("{n} changes pending"),
            DisplayKind::Synced => "Synced".to_string(),
        }
    }
}

/// Reduce connectivity, sync phase and pending count to one [`DisplayState`].
#[must_use]
pub const fn synthesize(online: bool, phase: SyncPhase, pending: u64) -> DisplayState {
    if !online {
        // Nothing to retry over without a network.
        return DisplayState::new(DisplayKind::Offline, Severity::Warning, false);
    }

    match phase {
        // Never offer a second sync while one is running.
        SyncPhase::Syncing => DisplayState::new(DisplayKind::Syncing, Severity::Info, false),
        SyncPhase::Error => DisplayState::new(DisplayKind::SyncError, Severity::Error, true),
        SyncPhase::Idle if pending > 0 => {
            DisplayState::new(DisplayKind::PendingChanges(pending), Severity::Info, true)
        }
        SyncPhase::Idle => DisplayState::new(DisplayKind::Synced, Severity::Neutral, false),
    }
}

/// The raw signals feeding [`synthesize`], bundled for callers that carry
/// them around together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncSignals {
    pub online: bool,
    pub phase: SyncPhase,
    pub pending: u64,
}

impl SyncSignals {
    #[must_use]
    pub const fn new(online: bool, phase: SyncPhase, pending: u64) -> Self {
        Self {
            online,
            phase,
            pending,
        }
    }

    #[must_use]
    pub const fn display_state(&self) -> DisplayState {
        synthesize(self.online, self.phase, self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use DisplayKind::{Offline, PendingChanges, SyncError, Synced, Syncing};
    use SyncPhase::{Error, Idle};

    fn kind(online: bool, phase: SyncPhase, pending: u64) -> DisplayKind {
        synthesize(online, phase, pending).kind
    }

    #[test]
    fn offline_dominates_every_other_signal() {
        assert_eq!(kind(false, Idle, 0), Offline);
        assert_eq!(kind(false, Idle, 1), Offline);
        assert_eq!(kind(false, Idle, 5), Offline);
        assert_eq!(kind(false, SyncPhase::Syncing, 0), Offline);
        assert_eq!(kind(false, SyncPhase::Syncing, 1), Offline);
        assert_eq!(kind(false, SyncPhase::Syncing, 5), Offline);
        assert_eq!(kind(false, Error, 0), Offline);
        assert_eq!(kind(false, Error, 1), Offline);
        assert_eq!(kind(false, Error, 5), Offline);
    }

    #[test]
    fn in_flight_sync_beats_error_and_pending() {
        assert_eq!(kind(true, SyncPhase::Syncing, 0), Syncing);
        assert_eq!(kind(true, SyncPhase::Syncing, 1), Syncing);
        assert_eq!(kind(true, SyncPhase::Syncing, 5), Syncing);
    }

    #[test]
    fn error_beats_pending() {
        assert_eq!(kind(true, Error, 0), SyncError);
        assert_eq!(kind(true, Error, 1), SyncError);
        assert_eq!(kind(true, Error, 3), SyncError);
        assert_eq!(kind(true, Error, 5), SyncError);
    }

    #[test]
    fn idle_reports_pending_or_synced() {
        assert_eq!(kind(true, Idle, 0), Synced);
        assert_eq!(kind(true, Idle, 1), PendingChanges(1));
        assert_eq!(kind(true, Idle, 5), PendingChanges(5));
    }

    #[test]
    fn actionable_only_for_error_and_pending() {
        assert!(!synthesize(false, Error, 5).actionable);
        assert!(!synthesize(true, SyncPhase::Syncing, 5).actionable);
        assert!(synthesize(true, Error, 0).actionable);
        assert!(synthesize(true, Idle, 5).actionable);
        assert!(!synthesize(true, Idle, 0).actionable);
    }

    #[test]
    fn action_agrees_with_actionable() {
        for online in [false, true] {
            for phase in [Idle, SyncPhase::Syncing, Error] {
                for pending in [0, 1, 5] {
                    let state = synthesize(online, phase, pending);
                    assert_eq!(state.action().is_some(), state.actionable);
                }
            }
        }
        assert_eq!(synthesize(true, Error, 2).action(), Some(StatusAction::Retry));
        assert_eq!(synthesize(true, Idle, 2).action(), Some(StatusAction::SyncNow));
    }

    #[test]
    fn repeated_calls_are_identical() {
        let first = synthesize(true, Idle, 7);
        for _ in 0..100 {
            assert_eq!(synthesize(true, Idle, 7), first);
        }
    }

    #[test]
    fn labels() {
        assert_eq!(synthesize(false, Idle, 0).label(), "Offline");
        assert_eq!(synthesize(true, Idle, 1).label(), "1 change pending");
        assert_eq!(synthesize(true, Idle, 3).label(), "3 changes pending");
        assert_eq!(synthesize(true, Idle, 0).label(), "Synced");
    }

    #[test]
    fn severity_orders_error_highest() {
        assert!(synthesize(true, Error, 0).severity > synthesize(false, Idle, 0).severity);
        assert_eq!(synthesize(true, Idle, 0).severity, Severity::Neutral);
    }

    #[test]
    fn signals_bundle_delegates() {
        let signals = SyncSignals::new(true, Error, 3);
        assert_eq!(signals.display_state(), synthesize(true, Error, 3));
        assert_eq!(SyncSignals::default().display_state().kind, Offline);
    }

    #[test]
    fn pending_serializes_with_count() {
        let json = serde_json::to_string(&synthesize(true, Idle, 4)).unwrap();
        assert!(json.contains(r#""kind":{"type":"pendingChanges","count":4}"#));
    }
}
