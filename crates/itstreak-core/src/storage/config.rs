//! TOML-based application configuration.
//!
//! Stores the default user for CLI invocations and push dispatch
//! settings. Configuration lives at `~/.config/itstreak/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::notify::transport::EXPO_PUSH_API_URL;

/// Push dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushConfig {
    /// Push service endpoint (Expo by default; overridable for staging).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/itstreak/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// User id assumed when the CLI is run without `--user`.
    #[serde(default)]
    pub default_user: Option<String>,
    #[serde(default)]
    pub push: PushConfig,
}

fn default_endpoint() -> String {
    EXPO_PUSH_API_URL.to_string()
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_user: None,
            push: PushConfig::default(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        data_dir().map(|dir| dir.join("config.toml")).map_err(|e| {
            ConfigError::LoadFailed {
                path: PathBuf::from("~/.config/itstreak"),
                message: e.to_string(),
            }
        })
    }

    /// Load from disk, writing the default config on first run.
    ///
    /// # Errors
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    /// Load from an explicit path (used by tests).
    pub fn load_from(path: &PathBuf) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.clone(),
                message: e.to_string(),
            }),
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    /// Returns an error if the config cannot be serialized or written.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        self.save_to(&path)
    }

    fn save_to(&self, path: &PathBuf) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let mut current = &json;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        match current {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key and persist.
    ///
    /// # Errors
    /// Returns an error if the key is unknown or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "default_user" => {
                self.default_user = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            "push.endpoint" => {
                self.push.endpoint = value.to_string();
            }
            _ => {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "unknown config key".to_string(),
                })
            }
        }
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_expo() {
        let cfg = Config::default();
        assert_eq!(cfg.push.endpoint, EXPO_PUSH_API_URL);
        assert!(cfg.default_user.is_none());
    }

    #[test]
    fn load_writes_default_on_first_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(cfg.push.endpoint, EXPO_PUSH_API_URL);

        // a second load reads the file back unchanged
        let again = Config::load_from(&path).unwrap();
        assert_eq!(again.push.endpoint, cfg.push.endpoint);
    }

    #[test]
    fn toml_roundtrip_preserves_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.default_user = Some("u-123".to_string());
        cfg.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_user.as_deref(), Some("u-123"));
    }

    #[test]
    fn get_by_dot_key() {
        let mut cfg = Config::default();
        cfg.default_user = Some("u-9".to_string());
        assert_eq!(cfg.get("default_user").as_deref(), Some("u-9"));
        assert_eq!(cfg.get("push.endpoint").as_deref(), Some(EXPO_PUSH_API_URL));
        assert_eq!(cfg.get("nope"), None);
    }
}
