//! Filesystem primitives for cached artifacts.
//!
//! - [`StagedFile`]: incremental writes that replace the destination only on commit
//! - [`atomic_write`]: one-shot variant for small payloads such as configuration
//! - [`modified`]: modification time in UTC, the only metadata freshness needs
//! - [`find_file`], [`find_contents`]: artifact lookup helpers

mod atomic;
mod error;
mod lookup;
mod modified;
mod staging;

pub use atomic::{atomic_write, read_to_string};
pub use error::{Error, ErrorKind, Result, from_io};
pub use lookup::{find_contents, find_file};
pub use modified::modified;
pub use staging::StagedFile;
