//! OS-facing runtime for llamadeck.
//!
//! Adapters implementing the `llamadeck-core` ports against real processes,
//! HTTP and the filesystem, plus the [`ServerController`] that drives one
//! llama-server through its lifecycle.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by integration tests only
#[cfg(test)]
use mockall as _;

pub mod binary;
mod catalog;
pub mod controller;
mod health;
pub mod process;
pub mod state_file;

// Re-export the controller
pub use controller::ServerController;

// Re-export port implementations
pub use catalog::DirectoryModelCatalog;
pub use health::HttpReadinessProbe;
pub use process::LlamaServerLauncher;

pub use binary::{BinaryError, resolve_llama_server};
pub use state_file::{StateFile, StateRecord};
