//! Storage layer for the ledger document. Provides:
//! - The [`Store`] abstraction: whole-document load/save
//! - An in-process backend ([`MemoryStore`])
//! - A JSON file backend ([`JsonFileStore`])
//!
//! Stores never update part of a document: every save replaces all of it.

mod json_file;
mod memory;

use async_trait::async_trait;

use crate::dto::Document;
use crate::error::StorageError;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

#[async_trait]
pub trait Store: Send + Sync {
    /// Reads the stored document, or `None` if nothing has been written yet.
    async fn fetch(&self) -> Result<Option<Document>, StorageError>;

    /// Replaces the stored document.
    async fn save(&self, document: &Document) -> Result<(), StorageError>;

    /// Stores `document` only if the backend holds nothing yet, in one atomic
    /// step. Returns whatever is stored afterwards: `document` if it was
    /// written, otherwise the existing document, which is left untouched.
    async fn init_if_absent(&self, document: &Document) -> Result<Document, StorageError>;

    /// Returns the current document, writing [`Document::seed`] first if the
    /// backend is empty. An existing document is returned as-is.
    ///
    /// Seeding goes through [`Store::init_if_absent`], so a loader racing with a
    /// committed save never puts the seed back over it.
    async fn load(&self) -> Result<Document, StorageError> {
        match self.fetch().await? {
            Some(document) => Ok(document),
            None => self.init_if_absent(&Document::seed()).await,
        }
    }
}
