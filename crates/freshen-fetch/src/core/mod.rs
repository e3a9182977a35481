//! Pure string transformations.

mod proxy;
mod urls;

pub use proxy::{DEFAULT_PROXY_SCHEME, normalize_proxy};
pub use urls::{extension_from_url, is_url};
