//! Pipeline error types

use ingot_core::{RowError, StoreError, TemplateError};
use thiserror::Error;

/// Failure to turn a chunk's blank node references into store identifiers
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// The upsert round trip failed
    #[error("chunk {chunk}: upsert of {} blank node(s) failed: {source}", .references.len())]
    Store {
        chunk: usize,
        references: Vec<String>,
        #[source]
        source: StoreError,
    },

    /// The upsert response did not have the expected shape
    #[error("chunk {chunk}: malformed upsert response: {detail}")]
    MalformedResponse { chunk: usize, detail: String },

    /// References still present after merging the upsert response
    #[error("chunk {chunk}: {} blank node(s) left unresolved: {}", .references.len(), .references.join(", "))]
    Unresolved {
        chunk: usize,
        references: Vec<String>,
    },
}

impl ResolutionError {
    /// Index of the chunk being resolved
    pub fn chunk(&self) -> usize {
        match self {
            Self::Store { chunk, .. }
            | Self::MalformedResponse { chunk, .. }
            | Self::Unresolved { chunk, .. } => *chunk,
        }
    }
}

/// Terminal outcome of a chunk commit
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// A non-conflict error; never retried
    #[error("commit failed on attempt {attempts}: {source}")]
    Terminal {
        attempts: u32,
        #[source]
        source: StoreError,
    },

    /// Every attempt lost a transaction conflict
    #[error("commit still conflicting after {attempts} attempt(s): {source}")]
    ConflictsExhausted {
        attempts: u32,
        #[source]
        source: StoreError,
    },
}

impl LoadError {
    /// Attempts made before giving up
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Terminal { attempts, .. } | Self::ConflictsExhausted { attempts, .. } => *attempts,
        }
    }

    /// The last store error seen
    pub fn store_error(&self) -> &StoreError {
        match self {
            Self::Terminal { source, .. } | Self::ConflictsExhausted { source, .. } => source,
        }
    }
}

/// Errors surfaced by [`IngestPipeline`](crate::IngestPipeline)
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("Row error: {0}")]
    Rows(#[from] RowError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Schema installation or identifier pre-seeding failed
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// A chunk failed to commit under the abort policy
    #[error("chunk {index} ({statements} statements) failed: {source}")]
    Chunk {
        index: usize,
        statements: usize,
        #[source]
        source: LoadError,
    },
}

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_lists_references() {
        let err = ResolutionError::Unresolved {
            chunk: 3,
            references: vec!["_:a".to_string(), "_:b".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "chunk 3: 2 blank node(s) left unresolved: _:a, _:b"
        );
        assert_eq!(err.chunk(), 3);
    }

    #[test]
    fn test_load_error_accessors() {
        let err = LoadError::ConflictsExhausted {
            attempts: 3,
            source: StoreError::aborted("conflict"),
        };
        assert_eq!(err.attempts(), 3);
        assert!(err.store_error().is_conflict());
    }
}
