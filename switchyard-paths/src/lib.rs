//! XDG Base Directory paths for switchyard.
//!
//! CLI tools should use XDG paths for cross-platform consistency,
//! not platform-native paths. This matches tools like gh, docker, kubectl.

use std::path::PathBuf;

/// Name of the config file inside the config directories.
pub const CONFIG_FILE: &str = "config.toml";

/// Get the switchyard config directory.
///
/// Returns `$XDG_CONFIG_HOME/switchyard` if set, otherwise `~/.config/switchyard`.
///
/// # Examples
///
/// ```
/// use switchyard_paths::config_dir;
///
/// let config = config_dir();
/// assert!(config.ends_with("switchyard"));
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("switchyard")
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config/switchyard")
    } else {
        PathBuf::from(".config/switchyard")
    }
}

/// Get the user config file path.
pub fn user_config_file() -> PathBuf {
    config_dir().join(CONFIG_FILE)
}

/// Get the project config directory.
///
/// Returns `$SWITCHYARD_PROJECT_CONFIG_DIR` if set (useful for isolated
/// tests), otherwise `.switchyard` relative to the working directory.
pub fn project_config_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("SWITCHYARD_PROJECT_CONFIG_DIR") {
        PathBuf::from(dir)
    } else {
        PathBuf::from(".switchyard")
    }
}

/// Get the project config file path.
pub fn project_config_file() -> PathBuf {
    project_config_dir().join(CONFIG_FILE)
}
