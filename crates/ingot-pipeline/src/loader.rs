//! Transactional chunk loader
//!
//! Each attempt runs in a fresh transaction:
//!
//! ```text
//! Start ──> Attempt ──┬──> Committed
//!              ▲      ├──> Retry ──(backoff)──┐
//!              └──────┼───────────────────────┘
//!                     └──> Terminal
//! ```
//!
//! Only transaction conflicts are retried, up to `max_attempts` attempts in
//! total. The transaction is discarded after every attempt, whatever its
//! outcome.

use crate::error::LoadError;
use ingot_config::LoaderConfig;
use ingot_core::{Chunk, GraphStore, Mutation, StoreError, StoreResult, StoreTransaction};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Successful commit of one chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommitReceipt {
    pub statements: usize,
    /// Store-reported latency of the committed mutation
    pub latency: Duration,
    pub attempts: u32,
}

/// Result of a single attempt
#[derive(Debug)]
enum Attempt {
    Committed(Duration),
    Retry(StoreError),
    Terminal(StoreError),
}

/// Commits chunks with bounded retry on transaction conflicts
#[derive(Debug, Clone, Default)]
pub struct TransactionalLoader {
    config: LoaderConfig,
}

impl TransactionalLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Commit `chunk` as one mutation, retrying conflicts
    pub async fn commit(
        &self,
        chunk: &Chunk,
        store: &dyn GraphStore,
    ) -> Result<CommitReceipt, LoadError> {
        let mutation = Mutation::set(chunk.to_text());
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match attempt(store, &mutation).await {
                Attempt::Committed(latency) => {
                    info!(
                        chunk = chunk.index,
                        statements = chunk.len(),
                        attempts,
                        ?latency,
                        "Chunk committed"
                    );
                    return Ok(CommitReceipt {
                        statements: chunk.len(),
                        latency,
                        attempts,
                    });
                }
                Attempt::Terminal(source) => {
                    error!(
                        "Chunk {} failed (attempt {}): {}",
                        chunk.index, attempts, source
                    );
                    return Err(LoadError::Terminal { attempts, source });
                }
                Attempt::Retry(source) => {
                    if attempts >= max_attempts {
                        error!(
                            "Chunk {} still conflicting after {} attempts: {}",
                            chunk.index, attempts, source
                        );
                        return Err(LoadError::ConflictsExhausted { attempts, source });
                    }
                    let delay = self.config.retry_delay(attempts);
                    warn!(
                        "Retrying chunk {} in {:?} (attempt {}/{}): {}",
                        chunk.index, delay, attempts, max_attempts, source
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

async fn attempt(store: &dyn GraphStore, mutation: &Mutation) -> Attempt {
    let mut txn = store.begin();
    let result = mutate_and_commit(txn.as_mut(), mutation).await;
    txn.discard().await;

    match result {
        Ok(latency) => Attempt::Committed(latency),
        Err(e) if e.is_conflict() => {
            debug!("Transaction conflict: {}", e);
            Attempt::Retry(e)
        }
        Err(e) => Attempt::Terminal(e),
    }
}

async fn mutate_and_commit(
    txn: &mut dyn StoreTransaction,
    mutation: &Mutation,
) -> StoreResult<Duration> {
    let response = txn.mutate(mutation).await?;
    txn.commit().await?;
    Ok(response.latency)
}
