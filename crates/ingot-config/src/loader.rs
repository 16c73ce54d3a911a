//! Configuration file loading

use crate::config::IngotConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use tracing::debug;

/// Supported configuration formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML (`.toml`)
    #[cfg(feature = "toml")]
    Toml,
    /// YAML (`.yaml`, `.yml`)
    #[cfg(feature = "yaml")]
    Yaml,
    /// JSON (`.json`)
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            #[cfg(feature = "toml")]
            "toml" => Ok(Self::Toml),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Loads [`IngotConfig`] from files or strings
pub struct ConfigLoader;

impl ConfigLoader {
    /// Read, parse and validate a configuration file
    pub fn load_from_file(path: impl AsRef<Path>) -> ConfigResult<IngotConfig> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading configuration from {}", path.display());
        Self::load_from_str(&text, format)
    }

    /// Parse and validate configuration text
    pub fn load_from_str(text: &str, format: ConfigFormat) -> ConfigResult<IngotConfig> {
        let config: IngotConfig = match format {
            #[cfg(feature = "toml")]
            ConfigFormat::Toml => toml::from_str(text).map_err(|e| ConfigError::Parse {
                format: "toml",
                message: e.to_string(),
            })?,
            #[cfg(feature = "yaml")]
            ConfigFormat::Yaml => {
                if text.trim().is_empty() {
                    IngotConfig::default()
                } else {
                    serde_yaml::from_str(text).map_err(|e| ConfigError::Parse {
                        format: "yaml",
                        message: e.to_string(),
                    })?
                }
            }
            ConfigFormat::Json => serde_json::from_str(text).map_err(|e| ConfigError::Parse {
                format: "json",
                message: e.to_string(),
            })?,
        };
        config.validate()?;
        Ok(config)
    }
}
