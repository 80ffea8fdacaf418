//! Model catalog entries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A GGUF model found in the model cache directory.
///
/// Read-only once returned; the catalog is re-scanned on every request
/// rather than cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    /// File name, which is also the identifier passed to `start`.
    pub name: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

impl ModelDescriptor {
    pub fn new(name: impl Into<String>, size_bytes: u64, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            path: path.into(),
        }
    }
}

/// Find a model by name in a catalog listing.
#[must_use]
pub fn find_model<'a>(models: &'a [ModelDescriptor], name: &str) -> Option<&'a ModelDescriptor> {
    models.iter().find(|m| m.name == name)
}
