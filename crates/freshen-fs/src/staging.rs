use std::path::{Path, PathBuf};

use tempfile::TempPath;
use tokio::io::AsyncWriteExt;

use crate::{Error, Result};

/// A file written next to its destination and moved into place on commit.
///
/// Until [`commit`](StagedFile::commit) succeeds the destination is never
/// touched. Dropping an uncommitted `StagedFile` deletes the staging file.
pub struct StagedFile {
    destination: PathBuf,
    file: tokio::fs::File,
    temp: TempPath,
    written: u64,
}

impl StagedFile {
    pub fn create(destination: impl AsRef<Path>) -> Result<Self> {
        let destination = destination.as_ref().to_path_buf();
        let file_name = destination
            .file_name()
            .ok_or_else(|| Error::InvalidDestination {
                path: destination.clone(),
            })?
            .to_string_lossy()
            .into_owned();
        let parent = match destination.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let named = tempfile::Builder::new()
            .prefix(&format!(".{file_name}."))
            .suffix(".part")
            .tempfile_in(&parent)
            .map_err(|e| Error::write(&parent, e))?;
        let (file, temp) = named.into_parts();

        Ok(Self {
            destination,
            file: tokio::fs::File::from_std(file),
            temp,
            written: 0,
        })
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }

    pub fn staging_path(&self) -> &Path {
        &self.temp
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub async fn write_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|e| Error::write(&self.temp, e))?;
        self.written += chunk.len() as u64;
        Ok(())
    }

    /// Flushes the staged bytes and renames them over the destination.
    pub async fn commit(self) -> Result<PathBuf> {
        let Self {
            destination,
            mut file,
            temp,
            written,
        } = self;

        file.flush().await.map_err(|e| Error::write(&temp, e))?;
        file.sync_all().await.map_err(|e| Error::write(&temp, e))?;
        drop(file);

        temp.persist(&destination)
            .map_err(|e| Error::write(&destination, e.error))?;
        tracing::trace!(path = %destination.display(), bytes = written, "committed staged file");
        Ok(destination)
    }
}
