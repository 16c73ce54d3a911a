//! Blank node resolution
//!
//! Blank labels are only meaningful inside one mutation, so a label that
//! spans chunks must be pinned to a store identifier. Each label is stored
//! on its node under the external identifier predicate; an upsert either
//! finds the node carrying the label or creates one.
//!
//! ```text
//! chunk ──> rewrite cached ──> upsert unknown ──> merge into cache ──> rewrite rest
//! ```

use crate::error::ResolutionError;
use ingot_config::ResolutionConfig;
use ingot_core::{
    blank_references, rewrite_blank_references, Chunk, GraphStore, IdentifierCache, Mutation,
    MutationResponse, StoreResult, StoreTransaction,
};
use serde_json::Value;
use tracing::{debug, info};

/// Resolves the blank node references of chunks
#[derive(Debug, Clone)]
pub struct BlankNodeResolver {
    xid_predicate: String,
}

impl Default for BlankNodeResolver {
    fn default() -> Self {
        Self::new("xid")
    }
}

impl BlankNodeResolver {
    pub fn new(xid_predicate: impl Into<String>) -> Self {
        Self {
            xid_predicate: xid_predicate.into(),
        }
    }

    pub fn from_config(config: &ResolutionConfig) -> Self {
        Self::new(config.xid_predicate.clone())
    }

    pub fn xid_predicate(&self) -> &str {
        &self.xid_predicate
    }

    /// Rewrite every blank reference in `chunk` to a store identifier
    ///
    /// References found in `cache` are substituted directly; the rest are
    /// upserted in a single transaction and added to `cache`. A chunk whose
    /// references are all cached causes no store round trip.
    pub async fn resolve(
        &self,
        chunk: &Chunk,
        cache: &mut IdentifierCache,
        store: &dyn GraphStore,
    ) -> Result<Chunk, ResolutionError> {
        let lines = rewrite_all(&chunk.lines, cache);
        let pending = distinct_references(&lines);
        if pending.is_empty() {
            debug!(chunk = chunk.index, "All blank nodes resolved from cache");
            return Ok(Chunk::new(chunk.index, lines));
        }

        let mutation = self.upsert_mutation(&pending);
        let mut txn = store.begin();
        let result = upsert(txn.as_mut(), &mutation).await;
        txn.discard().await;

        let response = result.map_err(|source| ResolutionError::Store {
            chunk: chunk.index,
            references: pending.clone(),
            source,
        })?;
        let resolved = merge_response(chunk.index, &pending, &response, cache)?;
        info!(
            chunk = chunk.index,
            requested = pending.len(),
            resolved,
            cached = cache.len(),
            "Resolved blank nodes"
        );

        let lines = rewrite_all(&lines, cache);
        let remaining = distinct_references(&lines);
        if !remaining.is_empty() {
            return Err(ResolutionError::Unresolved {
                chunk: chunk.index,
                references: remaining,
            });
        }
        Ok(Chunk::new(chunk.index, lines))
    }

    /// Upsert query and mutation for `labels`; alias `u_N` maps to `labels[N]`
    pub fn upsert_mutation(&self, labels: &[String]) -> Mutation {
        let mut query = String::from("{\n");
        let mut nquads = String::new();
        for (idx, label) in labels.iter().enumerate() {
            let label = escape(label);
            query.push_str(&format!(
                "  u_{idx} as u_{idx}(func: eq({}, \"{label}\")) {{ uid }}\n",
                self.xid_predicate
            ));
            nquads.push_str(&format!(
                "uid(u_{idx}) <{}> \"{label}\" .\n",
                self.xid_predicate
            ));
        }
        query.push('}');
        Mutation::upsert(query, nquads)
    }
}

async fn upsert(txn: &mut dyn StoreTransaction, mutation: &Mutation) -> StoreResult<MutationResponse> {
    let response = txn.mutate(mutation).await?;
    txn.commit().await?;
    Ok(response)
}

fn escape(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}

fn rewrite_all(lines: &[String], cache: &IdentifierCache) -> Vec<String> {
    lines
        .iter()
        .map(|line| rewrite_blank_references(line, |label| cache.get(label)))
        .collect()
}

/// Distinct blank labels in order of first appearance
fn distinct_references(lines: &[String]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for label in lines.iter().flat_map(|line| blank_references(line)) {
        if !seen.iter().any(|s| s == label) {
            seen.push(label.to_string());
        }
    }
    seen
}

fn alias_index(alias: &str) -> Option<usize> {
    alias.strip_prefix("u_")?.parse().ok()
}

/// Merge the upsert response into `cache`, returning how many labels it resolved
///
/// New nodes come back in `uids` keyed `uid(u_N)`; nodes that already
/// carried the label come back in `queries.u_N[0].uid`.
fn merge_response(
    chunk: usize,
    labels: &[String],
    response: &MutationResponse,
    cache: &mut IdentifierCache,
) -> Result<usize, ResolutionError> {
    let malformed = |detail: String| ResolutionError::MalformedResponse { chunk, detail };
    let label_for = |alias: &str| {
        alias_index(alias)
            .and_then(|idx| labels.get(idx))
            .ok_or_else(|| malformed(format!("unexpected alias '{alias}'")))
    };

    let mut resolved = 0;
    for (key, uid) in &response.uids {
        let Some(alias) = key
            .strip_prefix("uid(")
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            // blank labels of a plain mutation are not ours to interpret
            continue;
        };
        cache.insert(label_for(alias)?.clone(), uid.clone());
        resolved += 1;
    }

    match &response.queries {
        Value::Null => {}
        Value::Object(blocks) => {
            for (alias, nodes) in blocks {
                let label = label_for(alias)?;
                let nodes = nodes
                    .as_array()
                    .ok_or_else(|| malformed(format!("query block '{alias}' is not a list")))?;
                let Some(first) = nodes.first() else {
                    continue;
                };
                let uid = first["uid"]
                    .as_str()
                    .ok_or_else(|| malformed(format!("query block '{alias}' has no uid")))?;
                cache.insert(label.clone(), uid);
                resolved += 1;
            }
        }
        other => return Err(malformed(format!("queries is not an object: {other}"))),
    }
    Ok(resolved)
}
