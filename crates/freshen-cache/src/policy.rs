use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// When a cached file has to be fetched again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum UpdatePolicy {
    /// Once fetched, the file stays fresh forever.
    #[default]
    Never,
    /// Every check asks for a new fetch.
    Immediate,
    /// Stale once the file is at least this old.
    Interval(Duration),
}

impl UpdatePolicy {
    /// An interval policy; a zero interval is [`UpdatePolicy::Immediate`].
    pub fn every(interval: Duration) -> Self {
        if interval.is_zero() {
            UpdatePolicy::Immediate
        } else {
            UpdatePolicy::Interval(interval)
        }
    }

    /// The age after which a file is stale, `None` for [`UpdatePolicy::Never`].
    pub fn interval(self) -> Option<Duration> {
        match self {
            UpdatePolicy::Never => None,
            UpdatePolicy::Immediate => Some(Duration::ZERO),
            UpdatePolicy::Interval(interval) => Some(interval),
        }
    }

    /// Whether every check asks for a new fetch, a zero interval included.
    pub fn is_immediate(self) -> bool {
        self.interval() == Some(Duration::ZERO)
    }

    /// Whether a file last modified at `modified` is due at `now`.
    ///
    /// The boundary is inclusive. A modification time after `now` is never
    /// due under a non-zero interval.
    pub fn is_due(self, modified: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        match self {
            UpdatePolicy::Never => false,
            UpdatePolicy::Immediate => true,
            UpdatePolicy::Interval(interval) if interval.is_zero() => true,
            UpdatePolicy::Interval(interval) => match TimeDelta::from_std(interval) {
                Ok(limit) => now - modified >= limit,
                // Longer than chrono can represent.
                Err(_) => false,
            },
        }
    }
}

impl From<Option<Duration>> for UpdatePolicy {
    fn from(interval: Option<Duration>) -> Self {
        interval.map_or(UpdatePolicy::Never, UpdatePolicy::every)
    }
}

impl fmt::Display for UpdatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpdatePolicy::Never => f.write_str("never"),
            UpdatePolicy::Immediate => f.write_str("always"),
            UpdatePolicy::Interval(interval) if interval.is_zero() => f.write_str("always"),
            UpdatePolicy::Interval(interval) => {
                let secs = interval.as_secs();
                if secs % DAY == 0 {
                    write!(f, "every {}d", secs / DAY)
                } else if secs % HOUR == 0 {
                    write!(f, "every {}h", secs / HOUR)
                } else {
                    write!(f, "every {secs}s")
                }
            }
        }
    }
}

/// Positions 0 through 7 of the default period table.
pub const DEFAULT_UPDATE_PERIODS: [UpdatePolicy; 8] = [
    UpdatePolicy::Never,
    UpdatePolicy::Immediate,
    UpdatePolicy::Interval(Duration::from_secs(HOUR)),
    UpdatePolicy::Interval(Duration::from_secs(DAY)),
    UpdatePolicy::Interval(Duration::from_secs(7 * DAY)),
    UpdatePolicy::Interval(Duration::from_secs(30 * DAY)),
    // Half a year of 365 days.
    UpdatePolicy::Interval(Duration::from_secs(365 * DAY / 2)),
    UpdatePolicy::Interval(Duration::from_secs(365 * DAY)),
];
