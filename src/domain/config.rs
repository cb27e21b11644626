use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a student registry.
///
/// This controls where the record snapshot is kept and how it is written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The key the record snapshot is stored under.
    ///
    /// With the file backend this becomes the file name, so `studentRecords`
    /// is stored as `studentRecords.json`.
    storage_key: String,

    /// Whether the snapshot is written as indented JSON.
    pub pretty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            storage_key: default_storage_key(),
            pretty: true,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Loads the configuration from `config.toml` under `root`, falling back
    /// to the defaults if it is missing or invalid.
    #[must_use]
    pub fn load_or_default(root: &Path) -> Self {
        Self::load(&root.join(Self::FILE_NAME)).unwrap_or_else(|e| {
            tracing::debug!("Failed to load config: {e}");
            Self::default()
        })
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// The name of the configuration file within a registry root.
    pub const FILE_NAME: &'static str = "config.toml";

    /// Returns the key the snapshot is stored under.
    #[must_use]
    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    /// Sets the key the snapshot is stored under.
    ///
    /// Empty keys are ignored; returns `true` if the key was changed.
    pub fn set_storage_key(&mut self, key: impl Into<String>) -> bool {
        let key = key.into();
        if key.trim().is_empty() || key == self.storage_key {
            false
        } else {
            self.storage_key = key;
            true
        }
    }
}

fn default_storage_key() -> String {
    "studentRecords".to_string()
}

const fn default_pretty() -> bool {
    true
}

/// The serialized versions of the configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_storage_key")]
        storage_key: String,

        #[serde(default = "default_pretty")]
        pretty: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                storage_key,
                pretty,
            } => Self {
                storage_key,
                pretty,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            storage_key: config.storage_key,
            pretty: config.pretty,
        }
    }
}
