use std::borrow::Cow;

use freshen_notify::Classified;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("update period index {index} is outside the table (0..{len})")]
    PeriodOutOfRange { index: usize, len: usize },

    #[error(transparent)]
    Fs(#[from] freshen_fs::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A period setting that cannot be turned into a policy.
    Period,
    Io,
}

impl Classified for Error {
    type Kind = ErrorKind;

    fn kind_name(&self) -> Cow<'static, str> {
        match self {
            Error::PeriodOutOfRange { .. } => Cow::Borrowed("PeriodOutOfRange"),
            Error::Fs(inner) => inner.kind_name(),
        }
    }

    fn is_kind(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Period => matches!(self, Error::PeriodOutOfRange { .. }),
            ErrorKind::Io => matches!(self, Error::Fs(_)),
        }
    }
}
