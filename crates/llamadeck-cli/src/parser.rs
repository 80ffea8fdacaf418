//! Main CLI parser and top-level argument handling.
//!
//! Global options configure the controller and may also come from the
//! environment (or a `.env` file).

use clap::Parser;
use llamadeck_core::{DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT};

use crate::commands::Commands;

/// Command-line interface for managing a local llama-server.
#[derive(Debug, Parser)]
#[command(name = "llamadeck")]
#[command(about = "Run and monitor a local llama-server")]
#[command(version)]
pub struct Cli {
    /// Directory scanned for GGUF models (default: llama.cpp cache)
    #[arg(long = "models-dir", global = true, env = "LLAMADECK_MODELS_DIR")]
    pub models_dir: Option<String>,

    /// Path to the llama-server binary
    #[arg(long = "llama-server", global = true, env = "LLAMADECK_LLAMA_SERVER_PATH")]
    pub llama_server: Option<String>,

    /// Interface llama-server binds
    #[arg(long, global = true, env = "LLAMADECK_HOST", default_value = DEFAULT_SERVER_HOST)]
    pub host: String,

    /// Port llama-server listens on
    #[arg(long, global = true, env = "LLAMADECK_PORT", default_value_t = DEFAULT_SERVER_PORT)]
    pub port: u16,

    /// Do not persist the running server to the state file
    #[arg(long = "no-state-file", global = true)]
    pub no_state_file: bool,

    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}
