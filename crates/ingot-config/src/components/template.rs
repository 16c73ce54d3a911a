//! Template rendering configuration

use serde::{Deserialize, Serialize};

/// Template rendering settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Seed for the random source used by `randomDate`.
    ///
    /// `None` seeds from the operating system, which makes renders using
    /// `randomDate` non-reproducible.
    #[serde(default)]
    pub random_seed: Option<u64>,
}
