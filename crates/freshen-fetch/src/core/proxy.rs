use std::borrow::Cow;
use std::fmt::Write;

use url::Url;

/// Scheme given to proxy strings that do not name one.
pub const DEFAULT_PROXY_SCHEME: &str = "http";

/// Turns a user-supplied proxy string into a fully qualified URL.
///
/// Empty or absent input means "no proxy". A bare `host:port` gets the
/// `http` scheme; an explicit scheme is kept. The result is stable:
/// normalizing it again yields the same string.
///
/// ```
/// use freshen_fetch::normalize_proxy;
///
/// assert_eq!(normalize_proxy(Some("myproxy:8080")).as_deref(), Some("http://myproxy:8080"));
/// assert_eq!(normalize_proxy(Some("")), None);
/// assert_eq!(normalize_proxy(None), None);
/// ```
pub fn normalize_proxy(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }

    let candidate = if has_scheme(raw) {
        Cow::Borrowed(raw)
    } else {
        Cow::Owned(format!("{DEFAULT_PROXY_SCHEME}://{raw}"))
    };

    match Url::parse(&candidate) {
        Ok(url) if url.has_host() => Some(canonical(&url)),
        // Unparseable input is kept textually so the backend that consumes it
        // reports the problem.
        _ => Some(candidate.into_owned()),
    }
}

fn has_scheme(raw: &str) -> bool {
    let Some((scheme, _)) = raw.split_once("://") else {
        return false;
    };
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// `Url`'s own serialization appends "/" to an empty path, which would turn
// "http://myproxy:8080" into "http://myproxy:8080/".
fn canonical(url: &Url) -> String {
    let mut out = format!("{}://", url.scheme());
    if !url.username().is_empty() || url.password().is_some() {
        out.push_str(url.username());
        if let Some(password) = url.password() {
            out.push(':');
            out.push_str(password);
        }
        out.push('@');
    }
    if let Some(host) = url.host_str() {
        out.push_str(host);
    }
    if let Some(port) = url.port() {
        let _ = write!(out, ":{port}");
    }
    if url.path() != "/" {
        out.push_str(url.path());
    }
    if let Some(query) = url.query() {
        out.push('?');
        out.push_str(query);
    }
    if let Some(fragment) = url.fragment() {
        out.push('#');
        out.push_str(fragment);
    }
    out
}
