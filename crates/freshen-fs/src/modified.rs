use std::path::Path;

use chrono::{DateTime, Utc};

use crate::{Error, Result};

/// Last modification time of `path` in UTC, or `None` if nothing exists there.
pub fn modified(path: impl AsRef<Path>) -> Result<Option<DateTime<Utc>>> {
    let path = path.as_ref();
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::read(path, e)),
    };
    let time = metadata.modified().map_err(|e| Error::read(path, e))?;
    Ok(Some(DateTime::<Utc>::from(time)))
}
