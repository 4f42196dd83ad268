use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub const APP_NAME: &str = "romi";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding `index.html` and other static assets.
    pub public_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
}

impl FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            _ => Err(ConfigError::InvalidValue {
                key: "storage.backend".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            public_dir: PathBuf::from("public"),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            backend: StorageBackend::File,
            path: PathBuf::from("./data"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "romi=info,warp=info".to_string(),
        }
    }
}

/// Load `path` if it exists (defaults otherwise), then apply `ROMI_*` overrides.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let mut config = if path.exists() {
        let raw = std::fs::read_to_string(path)?;
        parse_config(&raw)?
    } else {
        Config::default()
    };

    apply_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

pub fn parse_config(raw: &str) -> Result<Config, ConfigError> {
    if raw.trim().is_empty() {
        return Ok(Config::default());
    }
    Ok(serde_yaml::from_str(raw)?)
}

fn apply_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup("ROMI_HOST") {
        config.api.host = host;
    }
    if let Some(port) = lookup("ROMI_PORT") {
        config.api.port = port.parse().map_err(|_| ConfigError::InvalidValue {
            key: "ROMI_PORT".to_string(),
            value: port.clone(),
        })?;
    }
    if let Some(dir) = lookup("ROMI_PUBLIC_DIR") {
        config.api.public_dir = PathBuf::from(dir);
    }
    if let Some(backend) = lookup("ROMI_STORAGE_BACKEND") {
        config.storage.backend = backend.parse()?;
    }
    if let Some(path) = lookup("ROMI_STORAGE_PATH") {
        config.storage.path = PathBuf::from(path);
    }
    if let Some(filter) = lookup("ROMI_LOG") {
        config.logging.filter = filter;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.storage.backend, StorageBackend::File);
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = parse_config("api:\n  port: 8080\nstorage:\n  backend: memory\n").unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, PathBuf::from("./data"));
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        assert!(matches!(parse_config("api: [unclosed"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn env_overrides_win() {
        let mut config = Config::default();
        apply_overrides(
            &mut config,
            env(&[
                ("ROMI_PORT", "9090"),
                ("ROMI_STORAGE_BACKEND", "Memory"),
                ("ROMI_STORAGE_PATH", "/tmp/romi"),
                ("ROMI_LOG", "debug"),
            ]),
        )
        .unwrap();
        assert_eq!(config.api.port, 9090);
        assert_eq!(config.storage.backend, StorageBackend::Memory);
        assert_eq!(config.storage.path, PathBuf::from("/tmp/romi"));
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn bad_overrides_are_rejected() {
        let mut config = Config::default();
        let err = apply_overrides(&mut config, env(&[("ROMI_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "ROMI_PORT"));

        let err = apply_overrides(&mut config, env(&[("ROMI_STORAGE_BACKEND", "firestore")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }
}
