//! Platform-specific directory management
//!
//! Provides the configuration directory used for global settings.
//! Follows XDG Base Directory Specification on Linux and standard locations on macOS.
//!
//! `PACKGATE_CONFIG_DIR` overrides the default directory.

use std::env;
use std::path::{Path, PathBuf};

use crate::config::defaults::SETTINGS_FILE;

/// Environment variable name for the config directory override
pub const ENV_CONFIG_DIR: &str = "PACKGATE_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "packgate";

/// Platform-specific directory provider for packgate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackgateDirs {
    config_dir: PathBuf,
}

impl PackgateDirs {
    /// Create a new `PackgateDirs` instance
    ///
    /// Checks the environment variable first, then falls back to platform defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Use an explicit config directory
    #[must_use]
    pub fn with_config_dir(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/packgate` or `~/.config/packgate`
    /// - macOS: `~/Library/Application Support/packgate`
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Get the global settings file path
    #[must_use]
    pub fn global_settings_path(&self) -> PathBuf {
        self.config_dir.join(SETTINGS_FILE)
    }

    /// Get the project-local settings file path
    #[must_use]
    pub fn project_settings_path(project_dir: &Path) -> PathBuf {
        project_dir.join(SETTINGS_FILE)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for PackgateDirs {
    fn default() -> Self {
        Self::new()
    }
}
