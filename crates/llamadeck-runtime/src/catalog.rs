//! Filesystem model catalog.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use llamadeck_core::ports::{DiscoveryError, ModelCatalogPort};
use llamadeck_core::ModelDescriptor;
use tracing::{debug, warn};

/// File extension of loadable models.
const MODEL_EXTENSION: &str = "gguf";

/// Lists `*.gguf` files in a single directory (not recursive).
#[derive(Debug, Clone)]
pub struct DirectoryModelCatalog {
    dir: PathBuf,
}

impl DirectoryModelCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn unreadable(&self, e: &io::Error) -> DiscoveryError {
        DiscoveryError::Unreadable {
            path: self.dir.clone(),
            reason: e.to_string(),
        }
    }
}

fn is_model_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(MODEL_EXTENSION))
}

#[async_trait]
impl ModelCatalogPort for DirectoryModelCatalog {
    async fn scan(&self) -> Result<Vec<ModelDescriptor>, DiscoveryError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(dir = %self.dir.display(), "Models directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(self.unreadable(&e)),
        };

        let mut models = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| self.unreadable(&e))? {
            let path = entry.path();
            if !is_model_file(&path) {
                continue;
            }
            let metadata = match entry.metadata().await {
                Ok(metadata) if metadata.is_file() => metadata,
                Ok(_) => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable model file");
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            models.push(ModelDescriptor::new(name, metadata.len(), path));
        }

        models.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(dir = %self.dir.display(), count = models.len(), "Scanned models");
        Ok(models)
    }

    fn location(&self) -> &Path {
        &self.dir
    }
}
