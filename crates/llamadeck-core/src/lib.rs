//! Core domain for llamadeck.
//!
//! Two pieces of logic live here, both free of infrastructure:
//!
//! - [`synthesize`] reduces connectivity, sync phase and pending-change count
//!   to the single [`DisplayState`] a user sees.
//! - The [`ServerRecord`] lifecycle model and the ports
//!   ([`ProcessLauncher`], [`ReadinessProbe`], [`ModelCatalogPort`]) the
//!   runtime controller is built against.
#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod events;
pub mod paths;
pub mod ports;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    DisplayKind, DisplayState, FailureReason, ModelDescriptor, ProcessState, ServerRecord,
    Severity, StatusAction, SyncPhase, SyncSignals, find_model, synthesize,
};
pub use events::{ServerEvent, ServerStateInfo};
pub use ports::{
    DiscoveryError, ExitInfo, LaunchSpec, ManagedProcess, ModelCatalogPort, ProbeOutcome,
    ProcessLauncher, ReadinessProbe, StartError, StopError,
};
pub use settings::{
    ControllerSettings, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT, SettingsError, validate_settings,
};
