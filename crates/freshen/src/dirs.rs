use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub const APP_DIR: &str = "freshen";

fn user_home() -> Option<PathBuf> {
    home::home_dir()
}

fn user_config() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        env::var_os("APPDATA").map(PathBuf::from)
    }
    #[cfg(target_os = "macos")]
    {
        user_home().map(|p| p.join("Library/Application Support"))
    }
    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        env::var_os("XDG_CONFIG_HOME")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from)
            .or_else(|| user_home().map(|p| p.join(".config")))
    }
}

/// Directory holding `settings.json`: the override if given, else the
/// platform configuration directory.
pub fn config_dir(over: Option<PathBuf>) -> Result<PathBuf> {
    match over {
        Some(dir) => Ok(dir),
        None => user_config()
            .map(|dir| dir.join(APP_DIR))
            .context("cannot determine the user configuration directory"),
    }
}
