//! llama-server binary availability checking and path resolution.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Environment variable overriding binary discovery.
pub const LLAMA_SERVER_PATH_ENV: &str = "LLAMADECK_LLAMA_SERVER_PATH";

/// Executable names searched on `PATH`.
const BINARY_NAMES: [&str; 2] = ["llama-server", "llama-cpp-server"];

/// Errors that can occur when resolving or validating the llama-server binary.
#[derive(Debug, Error)]
pub enum BinaryError {
    /// No llama-server binary was found.
    #[error(
        "llama-server binary not found (searched {searched} locations).\n\nInstall llama.cpp and make sure llama-server is on your PATH, or set {LLAMA_SERVER_PATH_ENV}."
    )]
    NotFound { searched: usize },

    /// An explicitly configured path does not exist.
    #[error("llama-server binary not found at: {path}")]
    Missing { path: PathBuf },

    /// The binary exists but is not executable.
    #[error("llama-server binary exists but is not executable: {path}")]
    NotExecutable { path: PathBuf },

    /// Metadata for the binary could not be read.
    #[error("Failed to inspect {path}: {reason}")]
    Inspect { path: PathBuf, reason: String },
}

/// Resolve the llama-server binary.
///
/// Precedence:
/// 1. `explicit` (from settings or a CLI flag)
/// 2. `LLAMADECK_LLAMA_SERVER_PATH`
/// 3. `llama-server` / `llama-cpp-server` on `PATH`
/// 4. Common install and build locations (`~/.local/bin`, `/usr/local/bin`,
///    `~/llama.cpp/build/bin`, `/opt/llama.cpp`)
///
/// Explicit paths are validated and never fall through to discovery.
pub fn resolve_llama_server(explicit: Option<&Path>) -> Result<PathBuf, BinaryError> {
    if let Some(path) = explicit {
        return validate_binary(path);
    }

    if let Ok(env_path) = std::env::var(LLAMA_SERVER_PATH_ENV) {
        if !env_path.trim().is_empty() {
            return validate_binary(Path::new(env_path.trim()));
        }
    }

    for name in BINARY_NAMES {
        if let Ok(path) = which::which(name) {
            debug!(path = %path.display(), "Found llama-server on PATH");
            return Ok(path);
        }
    }

    let candidates = fallback_candidates();
    let searched = candidates.len() + BINARY_NAMES.len();
    candidates
        .into_iter()
        .find_map(|candidate| validate_binary(&candidate).ok())
        .ok_or(BinaryError::NotFound { searched })
}

fn fallback_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local/bin/llama-server"));
        candidates.push(home.join("llama.cpp/build/bin/llama-server"));
        candidates.push(home.join("llama.cpp/llama-server"));
    }
    candidates.push(PathBuf::from("/usr/local/bin/llama-server"));
    candidates.push(PathBuf::from("/opt/llama.cpp/llama-server"));
    candidates
}

/// Validate that a binary exists and is executable.
fn validate_binary(path: &Path) -> Result<PathBuf, BinaryError> {
    if !path.is_file() {
        return Err(BinaryError::Missing {
            path: path.to_path_buf(),
        });
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let metadata = std::fs::metadata(path).map_err(|e| BinaryError::Inspect {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(BinaryError::NotExecutable {
                path: path.to_path_buf(),
            });
        }
    }

    Ok(path.to_path_buf())
}
