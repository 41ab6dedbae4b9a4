//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

/// Default map location used when a record carries no usable coordinates
/// (Coimbatore city center). Overridable via the `default_lat` /
/// `default_long` settings.
pub const DEFAULT_LAT: f64 = 11.0168;
pub const DEFAULT_LONG: f64 = 76.9558;

/// Hours covered by the "recent" aggregate listing
pub const DEFAULT_RECENT_WINDOW_HOURS: i64 = 24;

/// A latitude/longitude pair with its validity rules
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location {
    pub lat: f64,
    pub long: f64,
}

impl Location {
    pub fn new(lat: f64, long: f64) -> Self {
        Self { lat, long }
    }

    /// True when both coordinates are inside their valid ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.long)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::new(DEFAULT_LAT, DEFAULT_LONG)
    }
}

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&str>, env_var_name: &str) -> Result<PathBuf> {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return Ok(PathBuf::from(path));
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(env_var_name) {
        return Ok(PathBuf::from(path));
    }

    // Priority 3: TOML config file
    if let Ok(config_path) = locate_config_file() {
        if let Ok(toml_content) = std::fs::read_to_string(&config_path) {
            if let Ok(config) = toml::from_str::<toml::Value>(&toml_content) {
                if let Some(root_folder) = config.get("root_folder").and_then(|v| v.as_str()) {
                    return Ok(PathBuf::from(root_folder));
                }
            }
        }
    }

    // Priority 4: OS-dependent compiled default
    Ok(default_root_folder())
}

/// Locate the configuration file for the platform
fn locate_config_file() -> Result<PathBuf> {
    let user_config = dirs::config_dir()
        .map(|d| d.join("doormap").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if user_config.exists() {
        return Ok(user_config);
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/doormap/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
    }

    Err(Error::Config(format!(
        "Config file not found: {:?}",
        user_config
    )))
}

/// OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("doormap"))
        .unwrap_or_else(|| PathBuf::from("./doormap_data"))
}

/// Database file path under a root folder
pub fn database_path(root_folder: &std::path::Path) -> PathBuf {
    root_folder.join("doormap.db")
}
