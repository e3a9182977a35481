use std::io::Write;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Writes `content` to `path` through a staging file in the same directory.
pub fn atomic_write(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".")
        .suffix(".tmp")
        .tempfile_in(&parent)
        .map_err(|e| Error::write(&parent, e))?;
    tmp.write_all(content)
        .map_err(|e| Error::write(tmp.path(), e))?;
    tmp.as_file()
        .sync_all()
        .map_err(|e| Error::write(tmp.path(), e))?;
    tmp.persist(path).map_err(|e| Error::write(path, e.error))?;

    Ok(())
}

pub fn read_to_string(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(|e| Error::read(path, e))
}
