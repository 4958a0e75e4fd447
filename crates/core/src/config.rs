use std::{
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::PathBuf,
};

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;
use tracing::instrument;

use crate::assets::{default_config_path, get_default_config};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YAMLError(#[from] serde_yaml::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Shop identity and startup behavior.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StoreConfig {
    pub name: String,
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default)]
    pub seed_initial_stock: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            name: "Flores Bonitas".to_string(),
            currency: default_currency(),
            seed_initial_stock: false,
        }
    }
}

fn default_currency() -> String {
    "€".to_string()
}

/// Supported storage backends (serialized as lowercase strings).
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    Document,
    Sql,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match &self {
            StorageBackend::Memory => "memory",
            StorageBackend::Document => "document",
            StorageBackend::Sql => "sql",
        }
    }
}

/// Storage configuration. Backend specific keys are kept in `settings`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StorageConfig {
    #[serde(alias = "type")]
    pub backend: StorageBackend,
    #[serde(default, flatten)]
    pub settings: HashMap<String, serde_yaml::Value>,
}

impl StorageConfig {
    pub fn new(backend: StorageBackend) -> Self {
        Self {
            backend,
            settings: HashMap::new(),
        }
    }

    pub fn with_setting(mut self, key: &str, value: impl Into<serde_yaml::Value>) -> Self {
        self.settings.insert(key.to_string(), value.into());
        self
    }

    /// Deserializes a setting, `None` if missing or of the wrong shape.
    pub fn get_setting<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.settings
            .get(key)
            .and_then(|v| serde_yaml::from_value(v.clone()).ok())
    }

    pub fn require_setting<T: DeserializeOwned>(&self, key: &str) -> Result<T, ConfigError> {
        self.get_setting(key).ok_or_else(|| {
            ConfigError::Config(format!(
                "'{key}' setting is required for {} storage",
                self.backend.as_str()
            ))
        })
    }

    /// Setting as a filesystem path with `~` expanded.
    pub fn path_setting(&self, key: &str) -> Option<PathBuf> {
        self.get_setting::<String>(key)
            .map(|p| PathBuf::from(shellexpand::tilde(&p).into_owned()))
    }

    /// All settings as one YAML mapping, for backends configured from a value.
    pub fn settings_value(&self) -> serde_yaml::Value {
        let mapping = self
            .settings
            .iter()
            .map(|(k, v)| (serde_yaml::Value::String(k.clone()), v.clone()))
            .collect::<serde_yaml::Mapping>();
        serde_yaml::Value::Mapping(mapping)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub store: StoreConfig,
    pub storage: StorageConfig,
}

#[derive(Deserialize, Debug)]
struct RawConfig {
    #[serde(default)]
    store: Option<StoreConfig>,
    storage: StorageConfig,
}

impl RawConfig {
    #[instrument]
    fn to_config(&self) -> Result<Config, ConfigError> {
        let store = self.store.clone().unwrap_or_default();
        if store.name.trim().is_empty() {
            return Err(ConfigError::Config("Store name must not be empty".into()));
        }

        let storage = self.storage.clone();
        match storage.backend {
            StorageBackend::Sql => {
                let url: String = storage.require_setting("url")?;
                if url.trim().is_empty() {
                    return Err(ConfigError::Config("'url' must not be empty".into()));
                }
            }
            StorageBackend::Document => {
                storage.require_setting::<String>("path")?;
            }
            StorageBackend::Memory => {}
        }

        Ok(Config { store, storage })
    }
}

#[instrument(skip(config_path))]
pub fn create_or_get_config_file(
    config_path: Option<PathBuf>,
) -> Result<(bool, PathBuf), ConfigError> {
    let actual_path = config_path.unwrap_or_else(default_config_path);

    let parent_dir = actual_path.parent().ok_or_else(|| {
        ConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        File::create(&actual_path)?.write_all(get_default_config().as_bytes())?;
        Ok((false, actual_path))
    }
}

#[instrument(skip(config_path))]
pub fn get_config(config_path: Option<PathBuf>) -> Result<Config, ConfigError> {
    let (_, config_file) = create_or_get_config_file(config_path)?;
    let content = fs::read_to_string(&config_file)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let raw: RawConfig = serde_yaml::from_str(content)?;
    raw.to_config()
}
