use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Locates the cached artifact `name` inside `dir`.
///
/// With a known `extension` this is simply `dir/name.extension`. Otherwise the
/// regular files named `name.*` are ordered by modification time and the
/// first (oldest) one wins. If there is none the path with
/// `default_extension` is returned.
pub fn find_file(
    dir: impl AsRef<Path>,
    name: &str,
    extension: Option<&str>,
    default_extension: &str,
) -> PathBuf {
    let dir = dir.as_ref();
    if let Some(extension) = extension {
        return dir.join(format!("{name}.{extension}"));
    }

    let prefix = format!("{name}.");
    let first = std::fs::read_dir(dir).ok().and_then(|entries| {
        entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_name().to_string_lossy().starts_with(&prefix))
            .filter_map(|entry| {
                let metadata = entry.metadata().ok()?;
                if metadata.is_dir() {
                    return None;
                }
                let mtime = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                Some((mtime, entry.path()))
            })
            .min_by_key(|(mtime, _)| *mtime)
            .map(|(_, path)| path)
    });

    first.unwrap_or_else(|| dir.join(format!("{name}.{default_extension}")))
}

/// Descends through directories that contain exactly one entry.
///
/// Useful after unpacking an archive that wraps its payload in a single
/// top-level folder.
pub fn find_contents(path: impl AsRef<Path>) -> PathBuf {
    let mut path = path.as_ref().to_path_buf();
    loop {
        if path.is_file() {
            return path;
        }
        let Ok(mut entries) = std::fs::read_dir(&path) else {
            return path;
        };
        let first = entries.next().and_then(|e| e.ok());
        match (first, entries.next()) {
            (Some(only), None) => path = only.path(),
            _ => return path,
        }
    }
}
