//! Lifecycle events published by the controller.

mod server;

pub use server::{ServerEvent, ServerStateInfo};
