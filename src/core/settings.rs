//! Settings management
//!
//! Reads `packgate.toml` from the global config directory and from the
//! project directory. Project values take precedence over global ones.
//!
//! ```toml
//! generate_on_build = false
//!
//! [build]
//! command = ["cargo", "build"]
//!
//! [pack]
//! command = ["cargo", "package", "--allow-dirty"]
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::config::defaults::{DEFAULT_BUILD_COMMAND, DEFAULT_PACK_COMMAND};
use crate::error::SettingsError;
use crate::infra::dirs::PackgateDirs;

/// packgate settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Produce a package on every build
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generate_on_build: Option<bool>,

    /// Build step
    #[serde(default)]
    pub build: CommandConfig,

    /// Pack step
    #[serde(default)]
    pub pack: CommandConfig,
}

/// A configured external command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandConfig {
    /// Program followed by its arguments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
}

impl Settings {
    /// Load global settings merged with the project's own settings
    pub fn load(dirs: &PackgateDirs, project_dir: &Path) -> Result<Self, SettingsError> {
        let global = Self::load_from_path(&dirs.global_settings_path())?;
        let project = Self::load_from_path(&PackgateDirs::project_settings_path(project_dir))?;
        Ok(global.merge(project))
    }

    /// Load settings from a specific path
    ///
    /// A missing file yields the defaults; an unreadable or invalid one is an
    /// error.
    pub fn load_from_path(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.display().to_string(),
            error: e.to_string(),
        })
    }

    /// Overlay `other` on top of `self`
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            generate_on_build: other.generate_on_build.or(self.generate_on_build),
            build: CommandConfig {
                command: other.build.command.or(self.build.command),
            },
            pack: CommandConfig {
                command: other.pack.command.or(self.pack.command),
            },
        }
    }

    /// Effective package-on-build setting
    #[must_use]
    pub fn generate_on_build(&self) -> bool {
        self.generate_on_build.unwrap_or(false)
    }

    /// Effective build command
    pub fn build_command(&self) -> Result<Vec<String>, SettingsError> {
        resolve_command("build.command", self.build.command.as_ref(), DEFAULT_BUILD_COMMAND)
    }

    /// Effective pack command
    pub fn pack_command(&self) -> Result<Vec<String>, SettingsError> {
        resolve_command("pack.command", self.pack.command.as_ref(), DEFAULT_PACK_COMMAND)
    }
}

fn resolve_command(
    key: &str,
    configured: Option<&Vec<String>>,
    default: &[&str],
) -> Result<Vec<String>, SettingsError> {
    let command: Vec<String> = match configured {
        Some(command) => command.clone(),
        None => default.iter().map(ToString::to_string).collect(),
    };

    if command.first().map_or(true, |program| program.trim().is_empty()) {
        return Err(SettingsError::EmptyCommand {
            key: key.to_string(),
        });
    }

    Ok(command)
}
