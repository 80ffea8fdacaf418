//! Model catalog port.

use std::path::Path;

use async_trait::async_trait;

use super::DiscoveryError;
use crate::domain::ModelDescriptor;

/// Source of the models a server can be started with.
#[async_trait]
pub trait ModelCatalogPort: Send + Sync {
    /// Scan the catalog, returning entries sorted by name.
    async fn scan(&self) -> Result<Vec<ModelDescriptor>, DiscoveryError>;

    /// Where the catalog is read from, for display.
    fn location(&self) -> &Path;
}
