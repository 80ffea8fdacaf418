//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces the controller expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `tokio::process`, `reqwest` or filesystem types in signatures
//! - Intent-based methods (launch, terminate, probe), not OS details

pub mod model_catalog;
pub mod process_launcher;
pub mod readiness;

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::ProcessState;

pub use model_catalog::ModelCatalogPort;
pub use process_launcher::{ExitInfo, LaunchSpec, ManagedProcess, ProcessLauncher};
pub use readiness::{ProbeOutcome, ReadinessProbe};

/// Errors returned by `start`.
#[derive(Debug, Error)]
pub enum StartError {
    /// Another `start` or `stop` is still in flight.
    #[error("Another server operation is in progress")]
    OperationInProgress,

    /// The server is not in a state that allows starting.
    #[error("Cannot start while server is {0}")]
    InvalidState(ProcessState),

    /// The model is not in the last successful catalog listing.
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// The server binary could not be located.
    #[error("Server binary unavailable: {0}")]
    BinaryUnavailable(String),

    /// The OS refused to spawn the process.
    #[error("Failed to spawn server: {0}")]
    Spawn(String),

    /// Spawning did not complete in time.
    #[error("Spawning server timed out after {0:?}")]
    SpawnTimedOut(Duration),
}

/// Errors returned by `stop`.
#[derive(Debug, Error)]
pub enum StopError {
    /// Another `start` or `stop` is still in flight.
    #[error("Another server operation is in progress")]
    OperationInProgress,

    /// The server is not in a state that allows stopping.
    #[error("Cannot stop while server is {0}")]
    InvalidState(ProcessState),

    /// The termination signal could not be delivered.
    #[error("Failed to terminate server: {0}")]
    Terminate(String),
}

/// The model catalog could not be read.
///
/// Reported to the caller, never fatal: the caller may retry or carry on
/// with an empty list.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Cannot read model directory {path}: {reason}")]
    Unreadable { path: PathBuf, reason: String },
}
