//! Deciding when a cached download is stale, and refreshing it.
//!
//! Freshness is never stored: every check reads the cached file's
//! modification time and compares it, in UTC, with the configured
//! [`UpdatePolicy`].
//!
//! ```
//! use std::time::Duration;
//! use freshen_cache::{UpdatePeriodTable, UpdatePolicy};
//!
//! let table = UpdatePeriodTable::default();
//! assert_eq!(table.get(0), Some(UpdatePolicy::Never));
//! assert_eq!(table.get(2), Some(UpdatePolicy::every(Duration::from_secs(3600))));
//! ```

mod cacher;
mod error;
mod evaluator;
mod key;
mod policy;
mod table;
mod temporary;

pub use cacher::{Cacher, Refresh};
pub use error::{Error, ErrorKind, Result};
pub use evaluator::{requires_update, requires_update_at};
pub use key::{cache_key, cached_path};
pub use policy::{DEFAULT_UPDATE_PERIODS, UpdatePolicy};
pub use table::{PeriodSetting, UpdatePeriodTable};
pub use temporary::{TEMPORARY_DIR, TemporaryManager};
