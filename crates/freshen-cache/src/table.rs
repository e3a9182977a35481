use freshen_notify::{Guard, Handler, Notifier, Source};

use crate::error::Error;
use crate::policy::{DEFAULT_UPDATE_PERIODS, UpdatePolicy};

/// Ordered mapping from a small index (a UI slider position) to a policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdatePeriodTable {
    periods: Vec<UpdatePolicy>,
}

impl UpdatePeriodTable {
    /// Zero intervals are stored as [`UpdatePolicy::Immediate`].
    pub fn new(periods: impl Into<Vec<UpdatePolicy>>) -> Self {
        let periods = periods
            .into()
            .into_iter()
            .map(|policy| {
                if policy.is_immediate() {
                    UpdatePolicy::Immediate
                } else {
                    policy
                }
            })
            .collect();
        Self { periods }
    }

    pub fn get(&self, index: usize) -> Option<UpdatePolicy> {
        self.periods.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.periods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = UpdatePolicy> + '_ {
        self.periods.iter().copied()
    }

    /// Turns a setting into a policy.
    ///
    /// An index outside the table is reported under `cacheTimedelta` and
    /// yields [`UpdatePolicy::Never`].
    pub fn resolve(&self, setting: PeriodSetting, notifier: &Notifier) -> UpdatePolicy {
        let guard = Guard::<Error, UpdatePolicy>::new(notifier.clone()).otherwise(
            Handler::new("cacheTimedelta")
                .message(Source::Display)
                .returning(UpdatePolicy::Never),
        );
        guard.run(|| match setting {
            PeriodSetting::Policy(policy) => Ok(policy),
            PeriodSetting::Index(index) => self.get(index).ok_or(Error::PeriodOutOfRange {
                index,
                len: self.len(),
            }),
        })
    }
}

impl Default for UpdatePeriodTable {
    fn default() -> Self {
        Self::new(DEFAULT_UPDATE_PERIODS)
    }
}

/// A period as configured: a table position or an already resolved policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSetting {
    Index(usize),
    Policy(UpdatePolicy),
}

impl From<usize> for PeriodSetting {
    fn from(index: usize) -> Self {
        PeriodSetting::Index(index)
    }
}

impl From<UpdatePolicy> for PeriodSetting {
    fn from(policy: UpdatePolicy) -> Self {
        PeriodSetting::Policy(policy)
    }
}
