//! Package-on-build property
//!
//! Decides whether a build of a project also produces its package. The
//! generate-package command forces it on for the duration of its build.

use std::sync::{Mutex, PoisonError};

use super::settings::Settings;
use super::target::CommandTarget;
use crate::infra::dirs::PackgateDirs;

/// Package-on-build property evaluation
pub trait PackageOnBuildProperty: Send + Sync {
    /// Whether building `target` should also produce a package
    ///
    /// Anything that cannot be resolved evaluates to `false`.
    fn should_generate_on_build(&self, target: &CommandTarget) -> bool;

    /// Force the property to `value`, or clear the override with `None`
    fn override_generate_on_build(&self, value: Option<bool>);
}

/// Property backed by `packgate.toml`, with an in-memory override
#[derive(Debug, Default)]
pub struct SettingsPackageProperty {
    dirs: PackgateDirs,
    override_value: Mutex<Option<bool>>,
}

impl SettingsPackageProperty {
    /// Create a property reading settings from `dirs` and the project
    pub fn new(dirs: PackgateDirs) -> Self {
        Self {
            dirs,
            override_value: Mutex::new(None),
        }
    }

    fn current_override(&self) -> Option<bool> {
        *self
            .override_value
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl PackageOnBuildProperty for SettingsPackageProperty {
    fn should_generate_on_build(&self, target: &CommandTarget) -> bool {
        if let Some(value) = self.current_override() {
            return value;
        }

        let Some(project_dir) = target.project_dir() else {
            return false;
        };

        match Settings::load(&self.dirs, project_dir) {
            Ok(settings) => settings.generate_on_build(),
            Err(e) => {
                tracing::warn!("Could not evaluate generate_on_build: {e}");
                false
            }
        }
    }

    fn override_generate_on_build(&self, value: Option<bool>) {
        tracing::debug!("generate_on_build override: {value:?}");
        *self
            .override_value
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn property_in(config_dir: &TempDir) -> SettingsPackageProperty {
        SettingsPackageProperty::new(PackgateDirs::with_config_dir(config_dir.path()))
    }

    #[test]
    fn test_reads_project_setting() {
        let config_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(
            project_dir.path().join("packgate.toml"),
            "generate_on_build = true\n",
        )
        .unwrap();

        let property = property_in(&config_dir);
        assert!(property.should_generate_on_build(&CommandTarget::project(project_dir.path())));
    }

    #[test]
    fn test_override_takes_precedence() {
        let config_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        let target = CommandTarget::project(project_dir.path());
        let property = property_in(&config_dir);

        assert!(!property.should_generate_on_build(&target));

        property.override_generate_on_build(Some(true));
        assert!(property.should_generate_on_build(&target));

        property.override_generate_on_build(None);
        assert!(!property.should_generate_on_build(&target));
    }

    #[test]
    fn test_invalid_settings_evaluate_to_false() {
        let config_dir = TempDir::new().unwrap();
        let project_dir = TempDir::new().unwrap();
        fs::write(project_dir.path().join("packgate.toml"), "generate_on_build = [").unwrap();

        let property = property_in(&config_dir);
        assert!(!property.should_generate_on_build(&CommandTarget::project(project_dir.path())));
    }

    #[test]
    fn test_invalid_target_evaluates_to_false() {
        let config_dir = TempDir::new().unwrap();
        let property = property_in(&config_dir);
        assert!(!property.should_generate_on_build(&CommandTarget::default()));
    }
}
