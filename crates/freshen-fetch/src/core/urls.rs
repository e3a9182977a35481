use std::path::Path;

use url::Url;

/// Returns `true` if `candidate` parses as an absolute URL with a scheme.
pub fn is_url(candidate: &str) -> bool {
    Url::parse(candidate).is_ok()
}

/// File extension of the URL's path, without the dot, or `default`.
///
/// ```
/// use freshen_fetch::extension_from_url;
///
/// assert_eq!(extension_from_url("https://cdn.example/a/cover.jpg?s=200", "png"), "jpg");
/// assert_eq!(extension_from_url("https://cdn.example/avatar", "png"), "png");
/// ```
pub fn extension_from_url(url: &str, default: &str) -> String {
    let path = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_owned(),
        Err(_) => url.split(['?', '#']).next().unwrap_or_default().to_owned(),
    };
    Path::new(&path)
        .extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| !ext.is_empty())
        .unwrap_or_else(|| default.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_url() {
        assert!(is_url("https://example.com/feed.json"));
        assert!(!is_url("/home/user/cache/feed.json"));
        assert!(!is_url("feed.json"));
    }

    #[test]
    fn test_extension_from_url() {
        assert_eq!(extension_from_url("https://x.example/pkg.tar.gz", "bin"), "gz");
        assert_eq!(extension_from_url("https://x.example/.hidden", "bin"), "bin");
        assert_eq!(extension_from_url("images/thumb.webp#frag", "png"), "webp");
    }
}
