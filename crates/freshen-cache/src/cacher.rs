use std::path::Path;

use freshen_fetch::DownloadManager;
use tracing::debug;

use crate::evaluator::requires_update;
use crate::policy::UpdatePolicy;
use crate::table::{PeriodSetting, UpdatePeriodTable};

/// Outcome of [`Cacher::refresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    /// The cached file is still fresh; nothing was fetched.
    Fresh,
    /// A new copy was downloaded and stored.
    Updated,
    /// A download was needed but yielded nothing.
    Failed,
}

/// Fetches a resource only when its cached copy is stale.
#[derive(Debug)]
pub struct Cacher {
    downloads: DownloadManager,
    table: UpdatePeriodTable,
    policy: UpdatePolicy,
}

impl Cacher {
    pub fn new(downloads: DownloadManager, period: impl Into<PeriodSetting>) -> Self {
        Self::with_table(downloads, period, UpdatePeriodTable::default())
    }

    pub fn with_table(
        downloads: DownloadManager,
        period: impl Into<PeriodSetting>,
        table: UpdatePeriodTable,
    ) -> Self {
        let policy = table.resolve(period.into(), downloads.notifier());
        Self {
            downloads,
            table,
            policy,
        }
    }

    pub fn policy(&self) -> UpdatePolicy {
        self.policy
    }

    pub fn table(&self) -> &UpdatePeriodTable {
        &self.table
    }

    pub fn set_update_period(&mut self, period: impl Into<PeriodSetting>) {
        self.policy = self.table.resolve(period.into(), self.downloads.notifier());
    }

    pub fn downloads(&self) -> &DownloadManager {
        &self.downloads
    }

    pub fn downloads_mut(&mut self) -> &mut DownloadManager {
        &mut self.downloads
    }

    pub fn update_required(&self, path: impl AsRef<Path>) -> bool {
        requires_update(path, self.policy)
    }

    /// Downloads `url` to `destination` if the cached copy is stale.
    pub async fn refresh(&self, url: &str, destination: impl AsRef<Path>) -> Refresh {
        let destination = destination.as_ref();
        if !self.update_required(destination) {
            debug!(url, path = %destination.display(), "cached copy is fresh");
            return Refresh::Fresh;
        }
        if self.downloads.download_save(url, destination).await {
            Refresh::Updated
        } else {
            Refresh::Failed
        }
    }
}
