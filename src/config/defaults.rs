//! Default configuration values

/// Settings file name, both globally and in a project directory
pub const SETTINGS_FILE: &str = "packgate.toml";

/// Default build command
pub const DEFAULT_BUILD_COMMAND: &[&str] = &["cargo", "build"];

/// Default pack command, run after the build when packaging is requested
pub const DEFAULT_PACK_COMMAND: &[&str] = &["cargo", "package", "--allow-dirty"];

/// Command id of the project context menu entry
pub const CMD_GENERATE_PACKAGE_PROJECT_CONTEXT_MENU: u32 = 0x2000;

/// Command id of the top-level Build menu entry
pub const CMD_GENERATE_PACKAGE_TOP_LEVEL_BUILD: u32 = 0x2001;
