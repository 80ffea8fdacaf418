//! Subcommands.

use clap::{Subcommand, ValueEnum};
use llamadeck_core::SyncPhase;

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List GGUF models in the models directory
    Models,

    /// Start llama-server with a model and keep it running until Ctrl-C
    Serve {
        /// Model file name as listed by `models`
        model: String,
        /// Context size passed to llama-server
        #[arg(short = 'c', long = "ctx-size")]
        ctx_size: Option<u64>,
        /// Enable Jinja chat templates
        #[arg(long)]
        jinja: bool,
        /// Extra arguments for llama-server (after `--`)
        #[arg(last = true)]
        extra_args: Vec<String>,
    },

    /// Show the state of the managed server
    Status {
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Stop the managed server
    Stop,

    /// Show the status a sync indicator would display for the given signals
    SyncStatus {
        /// No network connectivity
        #[arg(long)]
        offline: bool,
        /// Phase reported by the sync engine
        #[arg(long, value_enum, default_value_t = PhaseArg::Idle)]
        phase: PhaseArg,
        /// Number of local changes not yet synced
        #[arg(long, default_value_t = 0)]
        pending: u64,
        /// Print the status as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show resolved paths for models, state file and llama-server
    Paths,
}

/// Sync phase as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PhaseArg {
    Idle,
    Syncing,
    Error,
}

impl From<PhaseArg> for SyncPhase {
    fn from(phase: PhaseArg) -> Self {
        match phase {
            PhaseArg::Idle => Self::Idle,
            PhaseArg::Syncing => Self::Syncing,
            PhaseArg::Error => Self::Error,
        }
    }
}
