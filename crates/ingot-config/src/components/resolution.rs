//! Blank-node resolution configuration

use serde::{Deserialize, Serialize};

/// Settings for identifier resolution against the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Predicate holding the external identifier of every node
    #[serde(default = "default_xid_predicate")]
    pub xid_predicate: String,
    /// Fill the identifier cache from the store before loading
    #[serde(default = "default_true")]
    pub preseed: bool,
    /// Page size of the pre-seed query
    #[serde(default = "default_preseed_batch_size")]
    pub preseed_batch_size: usize,
    /// Install `<xid>: string @index(exact) @upsert .` before loading
    #[serde(default = "default_true")]
    pub install_xid_schema: bool,
}

fn default_xid_predicate() -> String {
    "xid".to_string()
}

fn default_true() -> bool {
    true
}

fn default_preseed_batch_size() -> usize {
    10_000
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            xid_predicate: default_xid_predicate(),
            preseed: true,
            preseed_batch_size: default_preseed_batch_size(),
            install_xid_schema: true,
        }
    }
}
