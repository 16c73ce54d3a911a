//! Chunking and run-level configuration

use serde::{Deserialize, Serialize};

/// What to do when a chunk fails to commit
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkErrorPolicy {
    /// Stop the run at the first failed chunk
    #[default]
    Abort,
    /// Record the failure and move on to the next chunk
    Continue,
}

/// Pipeline-level settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Line count above which a chunk is flushed
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Behavior after a terminal chunk failure
    #[serde(default)]
    pub on_chunk_error: ChunkErrorPolicy,
}

fn default_chunk_size() -> usize {
    5000
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            on_chunk_error: ChunkErrorPolicy::default(),
        }
    }
}
