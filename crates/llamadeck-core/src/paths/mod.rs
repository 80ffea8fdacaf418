//! Path utilities for llamadeck data and model locations.
//!
//! - Returns `PathBuf` and `PathError` for clear error handling
//! - No interactive/terminal I/O
//! - OS-specific defaults come from the `dirs` crate

mod error;
mod models;
mod platform;
mod state;

pub use error::PathError;
pub use models::{
    LLAMA_CACHE_ENV, ModelsDirResolution, ModelsDirSource, default_models_dir, resolve_models_dir,
};
pub use platform::{DATA_DIR_ENV, data_root, normalize_user_path};
pub use state::{STATE_FILE_NAME, state_file_path};
