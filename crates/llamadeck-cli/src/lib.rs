//! Command-line adapter for llamadeck.
//!
//! `bootstrap` is the composition root wiring the runtime adapters into a
//! `ServerController`; handlers are thin and only format results.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tokio_test as _;

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;
pub mod presentation;

// Re-export primary types for convenient access
pub use bootstrap::{CliContext, bootstrap, controller_settings};
pub use commands::{Commands, PhaseArg};
pub use parser::Cli;
