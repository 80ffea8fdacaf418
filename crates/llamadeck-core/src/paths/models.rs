//! Model cache directory resolution.
//!
//! llama.cpp downloads models (`llama-server -hf ...`) into a per-user cache
//! directory. That directory is what the catalog scans by default.

use std::env;
use std::path::PathBuf;

use super::error::PathError;
use super::platform::normalize_user_path;

/// Environment variable used by llama.cpp itself for its cache location.
pub const LLAMA_CACHE_ENV: &str = "LLAMA_CACHE_DIR";

/// How the models directory was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelsDirSource {
    /// Passed explicitly (CLI flag or settings).
    Explicit,
    /// Came from `LLAMA_CACHE_DIR`.
    EnvVar,
    /// Platform default llama.cpp cache.
    Default,
}

/// Resolution result for the models directory.
#[derive(Debug, Clone)]
pub struct ModelsDirResolution {
    pub path: PathBuf,
    pub source: ModelsDirSource,
}

/// The llama.cpp cache directory for this platform.
///
/// - macOS: `~/Library/Caches/llama.cpp`
/// - elsewhere: `$XDG_CACHE_HOME/llama.cpp` (usually `~/.cache/llama.cpp`)
pub fn default_models_dir() -> Result<PathBuf, PathError> {
    dirs::cache_dir()
        .map(|cache| cache.join("llama.cpp"))
        .ok_or(PathError::NoHomeDir)
}

/// Resolve the models directory from an explicit path, `LLAMA_CACHE_DIR`,
/// or the platform default, in that order.
pub fn resolve_models_dir(explicit: Option<&str>) -> Result<ModelsDirResolution, PathError> {
    resolve_models_dir_from(explicit, env::var(LLAMA_CACHE_ENV).ok().as_deref())
}

fn resolve_models_dir_from(
    explicit: Option<&str>,
    env_value: Option<&str>,
) -> Result<ModelsDirResolution, PathError> {
    if let Some(path) = explicit {
        return Ok(ModelsDirResolution {
            path: normalize_user_path(path)?,
            source: ModelsDirSource::Explicit,
        });
    }

    if let Some(path) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(ModelsDirResolution {
            path: normalize_user_path(path)?,
            source: ModelsDirSource::EnvVar,
        });
    }

    Ok(ModelsDirResolution {
        path: default_models_dir()?,
        source: ModelsDirSource::Default,
    })
}
