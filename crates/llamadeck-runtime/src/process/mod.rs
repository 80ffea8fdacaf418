//! Process management for llama-server instances.
//!
//! - `LlamaServerLauncher` - spawns servers and adopts ones left running
//! - `ChildProcess` / `AdoptedProcess` - the two kinds of tracked process
//! - signal delivery, PID verification and log stream readers

mod adopted;
mod child;
mod launcher;
mod signal;
mod stream;
mod verify;

pub use adopted::AdoptedProcess;
pub use child::ChildProcess;
pub use launcher::LlamaServerLauncher;
pub use signal::{Termination, pid_exists, signal_pid};
pub use stream::{OutputTail, spawn_stream_reader};
pub use verify::is_llama_server;
