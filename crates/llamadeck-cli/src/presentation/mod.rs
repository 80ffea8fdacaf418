//! Presentation utilities for CLI output.

mod record;
mod tables;

pub use record::{describe_record, describe_state};
pub use tables::{format_size, print_separator, truncate_string};
