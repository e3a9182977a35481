use std::io;
use std::path::{Path, PathBuf};

use freshen_fetch::DownloadManager;
use freshen_fs::from_io;

use crate::error::Result;

/// Name of the scratch directory inside the cache directory.
pub const TEMPORARY_DIR: &str = "temporary";

/// A scratch directory owned by the application, emptied on startup.
#[derive(Debug)]
pub struct TemporaryManager {
    root: PathBuf,
    downloads: DownloadManager,
}

impl TemporaryManager {
    /// Takes over `<cache>/temporary`, discarding whatever it held.
    pub fn new(cache: impl AsRef<Path>, downloads: DownloadManager) -> Result<Self> {
        let manager = Self {
            root: cache.as_ref().join(TEMPORARY_DIR),
            downloads,
        };
        manager.clear()?;
        Ok(manager)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn downloads(&self) -> &DownloadManager {
        &self.downloads
    }

    /// Removes everything in the directory and recreates it empty.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_dir_all(&self.root) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => tracing::debug!(path = %self.root.display(), error = %e, "could not clear"),
        }
        std::fs::create_dir_all(&self.root).map_err(|e| from_io(&self.root, e, true))?;
        Ok(())
    }

    /// Downloads `url` into the directory; the stored path on success.
    pub async fn save_temporary(&self, url: &str, filename: impl AsRef<Path>) -> Option<PathBuf> {
        let destination = self.root.join(filename);
        self.downloads
            .download_save(url, &destination)
            .await
            .then_some(destination)
    }
}
