use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};

use freshen_notify::Classified;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("path not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("destination has no file name: {}", path.display())]
    InvalidDestination { path: PathBuf },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    PermissionDenied,
    /// Any filesystem failure.
    Io,
}

impl Error {
    pub(crate) fn read(path: impl AsRef<Path>, source: io::Error) -> Self {
        from_io(path, source, false)
    }

    pub(crate) fn write(path: impl AsRef<Path>, source: io::Error) -> Self {
        from_io(path, source, true)
    }

    pub fn path(&self) -> &Path {
        match self {
            Error::NotFound { path }
            | Error::PermissionDenied { path }
            | Error::Read { path, .. }
            | Error::Write { path, .. }
            | Error::InvalidDestination { path } => path,
        }
    }
}

pub fn from_io(path: impl AsRef<Path>, err: io::Error, writing: bool) -> Error {
    let path = path.as_ref().to_path_buf();
    match err.kind() {
        io::ErrorKind::NotFound => Error::NotFound { path },
        io::ErrorKind::PermissionDenied => Error::PermissionDenied { path },
        _ if writing => Error::Write { path, source: err },
        _ => Error::Read { path, source: err },
    }
}

impl Classified for Error {
    type Kind = ErrorKind;

    fn kind_name(&self) -> Cow<'static, str> {
        Cow::Borrowed(match self {
            Error::NotFound { .. } => "NotFound",
            Error::PermissionDenied { .. } => "PermissionDenied",
            Error::Read { .. } => "ReadError",
            Error::Write { .. } => "WriteError",
            Error::InvalidDestination { .. } => "InvalidDestination",
        })
    }

    fn is_kind(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::NotFound => matches!(self, Error::NotFound { .. }),
            ErrorKind::PermissionDenied => matches!(self, Error::PermissionDenied { .. }),
            ErrorKind::Io => true,
        }
    }
}
