//! Configuration loading.
//!
//! Settings come from three layers, later ones winning:
//! 1. Built-in defaults
//! 2. The TOML config file (`<config dir>/catalog-admin/config.toml` or `--config`)
//! 3. Command-line flags and their environment fallbacks

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::catalog::PLACEHOLDER_IMAGE;

pub const DEFAULT_SERVER: &str = "http://localhost:3000";
const APP_DIR: &str = "catalog-admin";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub server: Option<String>,
    pub log_file: Option<PathBuf>,
    pub placeholder_image: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub server: Option<String>,
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub server: String,
    pub log_file: Option<PathBuf>,
    pub placeholder_image: String,
    pub token_file: Option<PathBuf>,
}

impl Settings {
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Self {
        Settings {
            server: overrides
                .server
                .or(file.server)
                .unwrap_or_else(|| DEFAULT_SERVER.to_string()),
            log_file: overrides
                .log_file
                .or(file.log_file)
                .or_else(default_log_path),
            placeholder_image: file
                .placeholder_image
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            token_file: default_token_path(),
        }
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
}

pub fn default_token_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join("token"))
}

pub fn default_log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join(APP_DIR).join("catalog-admin.log"))
}

/// Read a config file. A missing file yields the empty config unless
/// `required` is set; a malformed file is always an error.
pub fn load_file(path: &Path, required: bool) -> Result<FileConfig> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == ErrorKind::NotFound && !required => {
            return Ok(FileConfig::default())
        }
        Err(e) => {
            return Err(e)
                .with_context(|| format!("Failed to read config file '{}'", path.display()))
        }
    };
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))
}

pub fn load(explicit: Option<&Path>, overrides: Overrides) -> Result<Settings> {
    let file = match explicit {
        Some(path) => load_file(path, true)?,
        None => match default_config_path() {
            Some(path) => load_file(&path, false)?,
            None => FileConfig::default(),
        },
    };
    Ok(Settings::resolve(file, overrides))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file_or_flags() {
        let settings = Settings::resolve(FileConfig::default(), Overrides::default());
        assert_eq!(settings.server, DEFAULT_SERVER);
        assert_eq!(settings.placeholder_image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn flags_override_file() {
        let file = FileConfig {
            server: Some("http://file:1".into()),
            log_file: Some("/tmp/file.log".into()),
            placeholder_image: Some("http://img/none.png".into()),
        };
        let overrides = Overrides {
            server: Some("http://flag:2".into()),
            log_file: None,
        };
        let settings = Settings::resolve(file, overrides);
        assert_eq!(settings.server, "http://flag:2");
        assert_eq!(settings.log_file, Some(PathBuf::from("/tmp/file.log")));
        assert_eq!(settings.placeholder_image, "http://img/none.png");
    }

    #[test]
    fn parses_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "server = \"http://catalog:8080\"\n").unwrap();

        let file = load_file(&path, true).unwrap();
        assert_eq!(file.server.as_deref(), Some("http://catalog:8080"));
    }

    #[test]
    fn missing_file_is_only_fatal_when_required() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");

        assert_eq!(load_file(&path, false).unwrap(), FileConfig::default());
        assert!(load_file(&path, true).is_err());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "servr = 3").unwrap();

        assert!(load_file(&path, false).is_err());
    }
}
