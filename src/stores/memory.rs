use async_trait::async_trait;
use tokio::sync::RwLock;

use super::Store;
use crate::dto::Document;
use crate::error::StorageError;

/// Keeps the document in process memory.
///
/// Useful for tests and throwaway sessions; contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    document: RwLock<Option<Document>>,
}

impl MemoryStore {
    /// An empty store; the first load seeds it.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding `document`, which is never replaced by the seed.
    pub fn with_document(document: Document) -> Self {
        Self {
            document: RwLock::new(Some(document)),
        }
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn fetch(&self) -> Result<Option<Document>, StorageError> {
        Ok(self.document.read().await.clone())
    }

    async fn save(&self, document: &Document) -> Result<(), StorageError> {
        *self.document.write().await = Some(document.clone());
        Ok(())
    }

    async fn init_if_absent(&self, document: &Document) -> Result<Document, StorageError> {
        let mut stored = self.document.write().await;
        if let Some(existing) = stored.as_ref() {
            return Ok(existing.clone());
        }
        *stored = Some(document.clone());
        tracing::info!(accounts = document.accounts.len(), "seeded empty ledger store");
        Ok(document.clone())
    }
}
