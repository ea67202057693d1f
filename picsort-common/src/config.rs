//! Configuration loading and root folder resolution

use crate::{Error, Result};
use std::path::PathBuf;

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
        if !path.is_empty() {
            return Ok(PathBuf::from(path));
        }
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

/// Get the configuration file path for the platform
fn locate_config_file() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/picsort/config.toml first, then /etc/picsort/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("picsort").join("config.toml"));
        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/picsort/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let config_path = dirs::config_dir()
        .map(|d| d.join("picsort").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;

    if config_path.exists() {
        Ok(config_path)
    } else {
        Err(Error::Config(format!(
            "Config file not found: {:?}",
            config_path
        )))
    }
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/picsort (or /var/lib/picsort for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("picsort"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/picsort"))
    } else if cfg!(target_os = "macos") {
        // ~/Library/Application Support/picsort
        dirs::data_dir()
            .map(|d| d.join("picsort"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/picsort"))
    } else if cfg!(target_os = "windows") {
        // %LOCALAPPDATA%\picsort
        dirs::data_local_dir()
            .map(|d| d.join("picsort"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\picsort"))
    } else {
        PathBuf::from("./picsort_data")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_cli_arg_wins_over_env() {
        std::env::set_var("PICSORT_TEST_ROOT", "/from/env");
        let resolved = resolve_root_folder(Some("/from/cli"), "PICSORT_TEST_ROOT").unwrap();
        assert_eq!(resolved, PathBuf::from("/from/cli"));
        std::env::remove_var("PICSORT_TEST_ROOT");
    }

    #[test]
    #[serial]
    fn test_env_var_used_when_no_cli_arg() {
        std::env::set_var("PICSORT_TEST_ROOT", "/from/env");
        let resolved = resolve_root_folder(None, "PICSORT_TEST_ROOT").unwrap();
        assert_eq!(resolved, PathBuf::from("/from/env"));
        std::env::remove_var("PICSORT_TEST_ROOT");
    }

    #[test]
    #[serial]
    fn test_fallback_produces_some_path() {
        std::env::remove_var("PICSORT_TEST_ROOT_UNSET");
        let resolved = resolve_root_folder(None, "PICSORT_TEST_ROOT_UNSET").unwrap();
        assert!(!resolved.as_os_str().is_empty());
    }
}
