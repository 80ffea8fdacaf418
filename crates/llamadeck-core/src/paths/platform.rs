//! Platform-specific roots and user path normalization.

use std::env;
use std::path::PathBuf;

use super::error::PathError;

/// Environment variable overriding the data root.
pub const DATA_DIR_ENV: &str = "LLAMADECK_DATA_DIR";

/// Get the root directory for application data (state file).
///
/// Resolution order:
/// 1. `LLAMADECK_DATA_DIR` environment variable
/// 2. System data directory (e.g., `~/.local/share/llamadeck`)
pub fn data_root() -> Result<PathBuf, PathError> {
    if let Ok(dir) = env::var(DATA_DIR_ENV) {
        if !dir.trim().is_empty() {
            return normalize_user_path(&dir);
        }
    }

    dirs::data_dir()
        .map(|d| d.join("llamadeck"))
        .ok_or(PathError::NoDataDir)
}

/// Expand a leading `~` and reject empty input.
pub fn normalize_user_path(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    if trimmed == "~" {
        return dirs::home_dir().ok_or(PathError::NoHomeDir);
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
        return Ok(home.join(rest));
    }

    Ok(PathBuf::from(trimmed))
}
