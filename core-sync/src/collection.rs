//! Directory to collection mirroring

use provider_catalog::{CatalogClient, Collection};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::entry::TrackedEntry;
use crate::error::Result;
use crate::path::{base_name, parent_path, PathInfo};
use crate::store::TrackedStore;

/// Creates one catalog collection per local directory
pub struct CollectionSync {
    catalog: Arc<dyn CatalogClient>,
    store: TrackedStore,
}

impl CollectionSync {
    pub fn new(catalog: Arc<dyn CatalogClient>, store: TrackedStore) -> Self {
        Self { catalog, store }
    }

    /// Mirror the directory at `path` unless it is already tracked
    ///
    /// The parent directory's collection id, when tracked, becomes the new
    /// collection's parent. Returns the stored entry, or `None` when the
    /// directory was already tracked.
    #[instrument(skip(self, info), fields(path = %path))]
    pub async fn sync_directory(&self, path: &str, info: &PathInfo) -> Result<Option<TrackedEntry>> {
        if self.store.is_complete(path).await? {
            debug!("Directory already tracked");
            return Ok(None);
        }

        let parent_id = self.parent_collection_id(path).await;

        let collection = self
            .catalog
            .create_collection(&Collection {
                title: base_name(path).to_string(),
                parent_id,
                ..Default::default()
            })
            .await?;

        let entry = TrackedEntry::directory(path, info, &collection.id);
        self.store.put(path, &entry).await?;

        info!(collection_id = %collection.id, "Created collection");
        Ok(Some(entry))
    }

    async fn parent_collection_id(&self, path: &str) -> String {
        let parent = parent_path(path);
        match self.store.collection_id(parent).await {
            Ok(id) => id.unwrap_or_default(),
            Err(e) => {
                warn!(parent = %parent, error = %e, "Failed to read parent entry");
                String::new()
            }
        }
    }
}
