use std::borrow::Cow;
use std::error::Error as StdError;
use std::path::PathBuf;

use freshen_notify::Classified;
use thiserror::Error;

type BoxError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Fs(#[from] freshen_fs::Error),

    #[error("invalid {format} in {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        format: &'static str,
        #[source]
        source: BoxError,
    },

    /// The in-memory value cannot be represented in the file format.
    #[error("cannot encode as {format}: {source}")]
    Encode {
        format: &'static str,
        #[source]
        source: BoxError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Permission,
    NotFound,
    Decode,
    /// Any filesystem failure.
    Io,
}

impl Classified for Error {
    type Kind = ErrorKind;

    fn kind_name(&self) -> Cow<'static, str> {
        match self {
            Error::Fs(inner) => inner.kind_name(),
            Error::Decode { .. } => Cow::Borrowed("DecodeError"),
            Error::Encode { .. } => Cow::Borrowed("EncodeError"),
        }
    }

    fn is_kind(&self, kind: ErrorKind) -> bool {
        match (kind, self) {
            (ErrorKind::Permission, Error::Fs(inner)) => {
                inner.is_kind(freshen_fs::ErrorKind::PermissionDenied)
            }
            (ErrorKind::NotFound, Error::Fs(inner)) => inner.is_kind(freshen_fs::ErrorKind::NotFound),
            (ErrorKind::Io, Error::Fs(_)) => true,
            (ErrorKind::Decode, Error::Decode { .. }) => true,
            _ => false,
        }
    }
}
