use std::path::Path;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::policy::UpdatePolicy;

/// Whether the file at `path` has to be fetched again under `policy`.
///
/// Only the file's modification time is read. A missing file always needs
/// an update, whatever the policy. A file whose modification time cannot be
/// read needs one unless the policy is [`UpdatePolicy::Never`].
pub fn requires_update(path: impl AsRef<Path>, policy: UpdatePolicy) -> bool {
    requires_update_at(path, policy, Utc::now())
}

/// [`requires_update`] evaluated at a given instant.
pub fn requires_update_at(path: impl AsRef<Path>, policy: UpdatePolicy, now: DateTime<Utc>) -> bool {
    let path = path.as_ref();
    if policy.is_immediate() {
        return true;
    }

    let modified = match freshen_fs::modified(path) {
        Ok(Some(modified)) => modified,
        Ok(None) => {
            debug!(path = %path.display(), "not cached yet");
            return true;
        }
        Err(err) => {
            debug!(path = %path.display(), error = %err, "cannot stat cached file");
            return policy != UpdatePolicy::Never;
        }
    };

    let due = policy.is_due(modified, now);
    debug!(path = %path.display(), %policy, %modified, due, "evaluated freshness");
    due
}
