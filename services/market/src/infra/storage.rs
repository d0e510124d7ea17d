//! Filesystem-backed note content store.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use bytes::Bytes;
use tokio::fs;

use crate::domain::repository::ContentStore;
use crate::error::MarketServiceError;

/// Stores each note file as `<root>/<handle>`.
#[derive(Debug, Clone)]
pub struct FsContentStore {
    root: PathBuf,
}

impl FsContentStore {
    /// Open the store, creating the root directory if needed.
    pub async fn new<P: AsRef<Path>>(root: P) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root)
            .await
            .with_context(|| format!("create content dir {}", root.display()))?;
        Ok(Self { root })
    }

    fn path_for(&self, handle: &str) -> Result<PathBuf, MarketServiceError> {
        let valid = !handle.is_empty()
            && !handle.contains(['/', '\\'])
            && !handle.contains("..")
            && !handle.starts_with('.');
        if !valid {
            return Err(anyhow::anyhow!("invalid content handle {handle:?}").into());
        }
        Ok(self.root.join(handle))
    }
}

impl ContentStore for FsContentStore {
    async fn put(&self, handle: &str, bytes: Bytes) -> Result<(), MarketServiceError> {
        let path = self.path_for(handle)?;
        // Write under a temporary name so readers never see a partial file.
        let tmp = self.root.join(format!(".{handle}.partial"));
        fs::write(&tmp, &bytes)
            .await
            .with_context(|| format!("write content {handle}"))?;
        fs::rename(&tmp, &path)
            .await
            .with_context(|| format!("publish content {handle}"))?;
        Ok(())
    }

    async fn get(&self, handle: &str) -> Result<Option<Bytes>, MarketServiceError> {
        let path = self.path_for(handle)?;
        match fs::read(&path).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("read content {handle}"))
                .into()),
        }
    }

    async fn delete(&self, handle: &str) -> Result<(), MarketServiceError> {
        let path = self.path_for(handle)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("delete content {handle}"))
                .into()),
        }
    }
}
