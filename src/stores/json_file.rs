use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;

use super::Store;
use crate::dto::Document;
use crate::error::StorageError;

/// Keeps the document in a pretty-printed JSON file.
///
/// Saves go to a sibling `.tmp` file which is then renamed over the target, so
/// a reader sees either the old document or the new one, never a torn write.
/// First-time initialization hard-links a fully written file into place, which
/// fails if the target already exists, so an existing ledger is never replaced.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        self.sibling(".tmp")
    }

    /// Unique per call, so concurrent initializers never share a file.
    fn init_path(&self) -> PathBuf {
        static NEXT: AtomicU64 = AtomicU64::new(0);
        let n = NEXT.fetch_add(1, Ordering::Relaxed);
        self.sibling(&format!(".{}.{}.init", process::id(), n))
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(suffix);
        PathBuf::from(name)
    }

    async fn create_parent(&self) -> io::Result<()> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent).await,
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl Store for JsonFileStore {
    async fn fetch(&self) -> Result<Option<Document>, StorageError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, document: &Document) -> Result<(), StorageError> {
        self.create_parent().await?;
        let bytes = serde_json::to_vec_pretty(document)?;
        let temp_path = self.temp_path();
        fs::write(&temp_path, bytes).await?;
        fs::rename(&temp_path, &self.path).await?;
        tracing::debug!(path = %self.path.display(), "ledger document saved");
        Ok(())
    }

    async fn init_if_absent(&self, document: &Document) -> Result<Document, StorageError> {
        self.create_parent().await?;
        let bytes = serde_json::to_vec_pretty(document)?;
        let init_path = self.init_path();
        fs::write(&init_path, bytes).await?;

        let linked = fs::hard_link(&init_path, &self.path).await;
        fs::remove_file(&init_path).await?;
        match linked {
            Ok(()) => {
                tracing::info!(path = %self.path.display(), "seeded empty ledger store");
                Ok(document.clone())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => match self.fetch().await? {
                Some(existing) => Ok(existing),
                None => Err(io::Error::new(ErrorKind::NotFound, "ledger file vanished during init").into()),
            },
            Err(e) => Err(e.into()),
        }
    }
}
