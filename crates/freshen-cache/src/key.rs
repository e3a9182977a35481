use std::path::{Path, PathBuf};

use freshen_fetch::extension_from_url;
use sha2::{Digest, Sha256};

/// Lowercase hex SHA-256 of `input`, used to name cached artifacts.
pub fn cache_key(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Where the artifact for `url` lives inside `dir`: its cache key plus the
/// URL's extension, or `default_extension` when it has none.
pub fn cached_path(dir: impl AsRef<Path>, url: &str, default_extension: &str) -> PathBuf {
    let extension = extension_from_url(url, default_extension);
    dir.as_ref()
        .join(format!("{}.{extension}", cache_key(url)))
}
