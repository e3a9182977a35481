//! Persisted configuration files.
//!
//! A [`ConfigFile`] owns one serializable value and the file it lives in.
//! Loading and saving never fail loudly for filesystem or format problems:
//! they are reported through a [`freshen_notify::Notifier`] under these
//! categories, each with the configuration name as message:
//!
//! | category                | when                                   |
//! |-------------------------|----------------------------------------|
//! | `configDirPermissions`  | the location cannot be created         |
//! | `configLoadPermissions` | the file cannot be read                |
//! | `configLoadJSON`        | the file does not decode (value reset) |
//! | `configLoad`            | any other read failure                 |
//! | `configSavePermissions` | the file cannot be written             |
//! | `configSaveNotFound`    | the location disappeared               |
//! | `configSave`            | any other write failure                |

mod codec;
mod error;
mod file;

pub use codec::{Codec, JsonCodec};
pub use error::{Error, ErrorKind, Result};
pub use file::ConfigFile;
