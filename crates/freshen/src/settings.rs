use std::path::Path;

use anyhow::Result;
use freshen_config::ConfigFile;
use freshen_notify::Notifier;
use serde::{Deserialize, Serialize};

pub const SETTINGS_NAME: &str = "settings";

/// Persisted defaults for every command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Position in the default update-period table.
    pub update_period: usize,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Daily.
            update_period: 3,
            proxy: None,
            user_agent: Some(concat!("freshen/", env!("CARGO_PKG_VERSION")).to_owned()),
        }
    }
}

impl Settings {
    pub fn open(dir: &Path, notifier: Notifier) -> Result<ConfigFile<Settings>> {
        Ok(ConfigFile::open(dir, SETTINGS_NAME, notifier)?)
    }

    /// Command-line values take precedence over persisted ones.
    #[must_use]
    pub fn overridden(
        &self,
        period: Option<usize>,
        proxy: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        Self {
            update_period: period.unwrap_or(self.update_period),
            proxy: proxy.or_else(|| self.proxy.clone()),
            user_agent: user_agent.or_else(|| self.user_agent.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win() {
        let stored = Settings {
            update_period: 5,
            proxy: Some("corp:3128".into()),
            user_agent: None,
        };

        let merged = stored.overridden(Some(1), None, Some("probe/1".into()));

        assert_eq!(merged.update_period, 1);
        assert_eq!(merged.proxy.as_deref(), Some("corp:3128"));
        assert_eq!(merged.user_agent.as_deref(), Some("probe/1"));
    }

    #[test]
    fn test_open_creates_settings_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = Settings::open(dir.path(), Notifier::silent()).unwrap();

        assert!(dir.path().join("settings.json").is_file());
        assert_eq!(*file.get(), Settings::default());
    }
}
