//! Opens the configured storage backend.
use std::sync::Arc;

use anyhow::{Context, Result};
use flowerstore_core::config::{StorageBackend, StorageConfig};
use flowerstore_core::repository::document::DocumentStore;
use flowerstore_core::repository::memory::MemoryStore;
use flowerstore_core::repository::{ProductRepository, TicketRepository};
use flowerstore_store_sql::SqlStore;
use tracing::{info, instrument};

/// Catalog and ticket repositories of one backend.
#[derive(Clone)]
pub struct Backend {
    pub products: Arc<dyn ProductRepository>,
    pub tickets: Arc<dyn TicketRepository>,
}

impl Backend {
    fn shared<S>(store: S) -> Self
    where
        S: ProductRepository + TicketRepository + 'static,
    {
        let store = Arc::new(store);
        Self {
            products: store.clone(),
            tickets: store,
        }
    }
}

#[instrument(skip(storage), fields(backend = storage.backend.as_str()))]
pub async fn open_backend(storage: &StorageConfig) -> Result<Backend> {
    let backend = match storage.backend {
        StorageBackend::Memory => Backend::shared(MemoryStore::new()),
        StorageBackend::Document => {
            let directory = storage
                .path_setting("path")
                .context("Document storage needs a 'path' setting")?;
            let store = DocumentStore::open(directory.clone()).await.with_context(|| {
                format!("Failed to open document store at {}", directory.display())
            })?;
            Backend::shared(store)
        }
        StorageBackend::Sql => {
            let store = SqlStore::from_config(&storage.settings_value())
                .await
                .context("Failed to connect to the sql store")?;
            Backend::shared(store)
        }
    };
    info!("Storage backend ready");
    Ok(backend)
}
