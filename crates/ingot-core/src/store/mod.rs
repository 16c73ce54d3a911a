//! Graph store abstraction
//!
//! Backends implement [`GraphStore`] for queries and schema changes, and
//! hand out [`StoreTransaction`]s for mutations. A transaction is scoped to
//! a single attempt: callers discard it on every exit path, and discarding
//! an already committed transaction is a no-op.

mod error;

pub use error::{StoreError, StoreResult};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// A mutation request, optionally guarded by an upsert query
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mutation {
    /// Query block whose variables the mutation may reference
    pub query: Option<String>,
    /// N-Quad statements to set
    pub set_nquads: String,
}

impl Mutation {
    /// Plain mutation setting `nquads`
    pub fn set(nquads: impl Into<String>) -> Self {
        Self {
            query: None,
            set_nquads: nquads.into(),
        }
    }

    /// Upsert: run `query`, then set `nquads` with its variables bound
    pub fn upsert(query: impl Into<String>, nquads: impl Into<String>) -> Self {
        Self {
            query: Some(query.into()),
            set_nquads: nquads.into(),
        }
    }
}

/// Store response to a mutation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MutationResponse {
    /// Newly allocated identifiers, keyed by blank label or `uid(var)`
    pub uids: HashMap<String, String>,
    /// Results of the upsert query blocks, keyed by block name
    pub queries: Value,
    /// Server-reported processing time
    pub latency: Duration,
}

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Run a read-only query and return its `data` object
    async fn query(&self, query: &str) -> StoreResult<Value>;

    /// Apply a schema change
    async fn alter(&self, schema: &str) -> StoreResult<()>;

    /// Start a new read-write transaction
    fn begin(&self) -> Box<dyn StoreTransaction>;
}

#[async_trait]
pub trait StoreTransaction: Send {
    async fn mutate(&mut self, mutation: &Mutation) -> StoreResult<MutationResponse>;

    async fn commit(&mut self) -> StoreResult<()>;

    /// Abandon the transaction; never fails
    async fn discard(&mut self);
}
