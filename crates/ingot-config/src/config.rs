//! Top-level configuration

use crate::components::*;
use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// Complete loader configuration
///
/// Every section has defaults, so a partial file only needs to name the
/// settings it changes:
///
/// ```toml
/// [pipeline]
/// chunk_size = 1000
///
/// [resolution]
/// xid_predicate = "external_id"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngotConfig {
    /// Template rendering
    #[serde(default)]
    pub template: TemplateConfig,
    /// CSV input
    #[serde(default)]
    pub rows: RowsConfig,
    /// Chunking and failure policy
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Commit retries
    #[serde(default)]
    pub loader: LoaderConfig,
    /// Blank-node resolution
    #[serde(default)]
    pub resolution: ResolutionConfig,
    /// Store connection
    #[serde(default)]
    pub store: StoreConfig,
}

impl IngotConfig {
    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> ConfigResult<()> {
        if self.pipeline.chunk_size == 0 {
            return Err(ConfigError::invalid(
                "pipeline.chunk_size",
                "must be greater than zero",
            ));
        }
        if self.loader.max_attempts == 0 {
            return Err(ConfigError::invalid(
                "loader.max_attempts",
                "at least one attempt is required",
            ));
        }
        if self.loader.max_retry_delay_ms < self.loader.retry_delay_ms {
            return Err(ConfigError::invalid(
                "loader.max_retry_delay_ms",
                "must not be lower than loader.retry_delay_ms",
            ));
        }
        if self.resolution.preseed_batch_size == 0 {
            return Err(ConfigError::invalid(
                "resolution.preseed_batch_size",
                "must be greater than zero",
            ));
        }
        let xid = &self.resolution.xid_predicate;
        if xid.is_empty()
            || !xid
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
        {
            return Err(ConfigError::invalid(
                "resolution.xid_predicate",
                format!("'{xid}' is not a valid predicate name"),
            ));
        }
        if !self.rows.delimiter.is_ascii() {
            return Err(ConfigError::invalid(
                "rows.delimiter",
                "must be a single ASCII character",
            ));
        }
        if self.store.endpoint.trim().is_empty() {
            return Err(ConfigError::invalid("store.endpoint", "must not be empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = IngotConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.pipeline.chunk_size, 5000);
        assert_eq!(config.loader.max_attempts, 3);
        assert_eq!(config.resolution.xid_predicate, "xid");
        assert_eq!(config.resolution.preseed_batch_size, 10_000);
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let mut config = IngotConfig::default();
        config.pipeline.chunk_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("pipeline.chunk_size"));
    }

    #[test]
    fn test_rejects_zero_attempts() {
        let mut config = IngotConfig::default();
        config.loader.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_xid_predicate() {
        let mut config = IngotConfig::default();
        config.resolution.xid_predicate = "x id".to_string();
        assert!(config.validate().is_err());

        config.resolution.xid_predicate = "Person.xid".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_delay_doubles_and_caps() {
        let loader = LoaderConfig {
            max_attempts: 5,
            retry_delay_ms: 100,
            max_retry_delay_ms: 250,
        };
        assert_eq!(loader.retry_delay(1).as_millis(), 100);
        assert_eq!(loader.retry_delay(2).as_millis(), 200);
        assert_eq!(loader.retry_delay(3).as_millis(), 250);
    }

    #[test]
    fn test_null_markers_follow_pandas_defaults() {
        let rows = RowsConfig::default();
        assert!(rows.is_null(""));
        assert!(rows.is_null("NaN"));
        assert!(rows.is_null("N/A"));
        assert!(!rows.is_null("0"));
        assert!(!rows.is_null("Ada"));
    }
}
