//! Command handlers.

pub mod models;
pub mod paths;
pub mod serve;
pub mod status;
pub mod stop;
pub mod sync_status;
