//! Domain types for llamadeck.
//!
//! Pure data and pure functions with no infrastructure dependencies.

pub mod model;
pub mod server;
pub mod status;

pub use model::{ModelDescriptor, find_model};
pub use server::{FailureReason, ProcessState, ServerRecord};
pub use status::{
    DisplayKind, DisplayState, Severity, StatusAction, SyncPhase, SyncSignals, synthesize,
};
