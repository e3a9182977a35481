//! Error types for freshen-fetch.

use std::borrow::Cow;
use std::io;

use freshen_notify::Classified;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid proxy: {0}")]
    Proxy(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("request timeout: {0}")]
    Timeout(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("download cancelled")]
    Cancelled,

    #[error("network I/O error: {0}")]
    Io(#[source] io::Error),

    #[error(transparent)]
    Fs(#[from] freshen_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Dispatch kinds for [`Guard`](freshen_notify::Guard) arms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// DNS failure, refused or reset connection, timeout.
    Connection,
    /// Anything the transport layer raised, connection failures included.
    Transport,
    /// Failure while persisting to the local filesystem.
    Io,
}

impl Error {
    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection(_) | Error::Timeout(_))
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        match e.kind() {
            io::ErrorKind::TimedOut => Error::Timeout(e.to_string()),
            io::ErrorKind::ConnectionRefused
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::NotConnected
            | io::ErrorKind::AddrNotAvailable
            | io::ErrorKind::BrokenPipe
            | io::ErrorKind::UnexpectedEof => Error::Connection(e.to_string()),
            io::ErrorKind::InvalidData => Error::MalformedResponse(e.to_string()),
            _ => Error::Io(e),
        }
    }
}

#[cfg(any(feature = "stream", feature = "pooled"))]
impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let text = describe(&e);
        if e.is_timeout() {
            Error::Timeout(text)
        } else if e.is_connect() {
            Error::Connection(text)
        } else if e.is_builder() {
            Error::InvalidUrl(text)
        } else {
            Error::Http(text)
        }
    }
}

/// The error text followed by its causes, which reqwest keeps out of `Display`.
#[cfg(any(feature = "stream", feature = "pooled"))]
fn describe(e: &dyn std::error::Error) -> String {
    let mut text = e.to_string();
    let mut cause = e.source();
    while let Some(inner) = cause {
        text.push_str(": ");
        text.push_str(&inner.to_string());
        cause = inner.source();
    }
    text
}

impl Classified for Error {
    type Kind = ErrorKind;

    fn kind_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Error::InvalidUrl(_) => "InvalidUrl",
            Error::UnsupportedScheme(_) => "UnsupportedScheme",
            Error::Proxy(_) => "ProxyError",
            Error::Connection(_) => "ConnectionError",
            Error::Timeout(_) => "TimeoutError",
            Error::MalformedResponse(_) => "MalformedResponse",
            Error::Http(_) => "HttpError",
            Error::Cancelled => "Cancelled",
            Error::Io(_) => "IoError",
            Error::Fs(inner) => return inner.kind_name(),
        })
    }

    fn is_kind(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Connection => self.is_connection(),
            ErrorKind::Transport => !matches!(self, Error::Fs(_)),
            ErrorKind::Io => matches!(self, Error::Fs(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_errors_map_to_connection() {
        let refused: Error = io::Error::from(io::ErrorKind::ConnectionRefused).into();
        let timeout: Error = io::Error::from(io::ErrorKind::TimedOut).into();
        let garbled: Error = io::Error::from(io::ErrorKind::InvalidData).into();

        assert!(refused.is_kind(ErrorKind::Connection));
        assert!(refused.is_kind(ErrorKind::Transport));
        assert!(timeout.is_kind(ErrorKind::Connection));
        assert!(!garbled.is_kind(ErrorKind::Connection));
        assert!(garbled.is_kind(ErrorKind::Transport));
    }

    #[test]
    fn test_fs_errors_are_io_not_transport() {
        let err = Error::from(freshen_fs::Error::PermissionDenied {
            path: "/cache/a.png".into(),
        });

        assert!(err.is_kind(ErrorKind::Io));
        assert!(!err.is_kind(ErrorKind::Transport));
        assert_eq!(err.kind_name(), "PermissionDenied");
    }
}
