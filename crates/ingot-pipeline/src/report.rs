//! Per-chunk and per-run load reports

use crate::error::LoadError;
use crate::loader::CommitReceipt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkOutcome {
    Committed,
    /// Only recorded under the `continue` chunk error policy
    Failed(LoadError),
}

/// Outcome of one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReport {
    pub index: usize,
    pub statements: usize,
    pub latency: Duration,
    pub attempts: u32,
    pub outcome: ChunkOutcome,
}

impl ChunkReport {
    pub(crate) fn committed(index: usize, receipt: CommitReceipt) -> Self {
        Self {
            index,
            statements: receipt.statements,
            latency: receipt.latency,
            attempts: receipt.attempts,
            outcome: ChunkOutcome::Committed,
        }
    }

    pub(crate) fn failed(index: usize, statements: usize, error: LoadError) -> Self {
        Self {
            index,
            statements,
            latency: Duration::ZERO,
            attempts: error.attempts(),
            outcome: ChunkOutcome::Failed(error),
        }
    }

    pub fn is_committed(&self) -> bool {
        self.outcome == ChunkOutcome::Committed
    }
}

/// Outcome of a load run, chunk by chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub chunks: Vec<ChunkReport>,
}

impl IngestReport {
    pub fn committed_chunks(&self) -> usize {
        self.chunks.iter().filter(|c| c.is_committed()).count()
    }

    pub fn failed_chunks(&self) -> usize {
        self.chunks.len() - self.committed_chunks()
    }

    /// Statements in committed chunks
    pub fn statements_committed(&self) -> usize {
        self.chunks
            .iter()
            .filter(|c| c.is_committed())
            .map(|c| c.statements)
            .sum()
    }

    /// Sum of store-reported latencies
    pub fn total_latency(&self) -> Duration {
        self.chunks.iter().map(|c| c.latency).sum()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_chunks() == 0
    }
}
