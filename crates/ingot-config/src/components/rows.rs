//! Tabular input configuration

use serde::{Deserialize, Serialize};

/// Cell values treated as missing, matching the pandas `read_csv` defaults
pub const DEFAULT_NULL_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// CSV reading settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowsConfig {
    /// Field delimiter (single ASCII character)
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Cell values that mark a value as missing
    #[serde(default = "default_null_markers")]
    pub null_markers: Vec<String>,
}

fn default_delimiter() -> char {
    ','
}

fn default_null_markers() -> Vec<String> {
    DEFAULT_NULL_MARKERS.iter().map(|s| s.to_string()).collect()
}

impl Default for RowsConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            null_markers: default_null_markers(),
        }
    }
}

impl RowsConfig {
    /// Check whether a raw cell value is a missing-value marker
    pub fn is_null(&self, value: &str) -> bool {
        self.null_markers.iter().any(|m| m == value)
    }
}
