//! In-memory graph store for tests
//!
//! [`MockGraphStore`] behaves like a single Dgraph alpha with an external
//! identifier predicate:
//!
//! - upsert queries of the form `u_0 as u_0(func: eq(xid, "_:a")) { uid }`
//!   match existing identifiers or allocate new ones on commit
//! - paged `xidmap` queries return known identifiers in uid order
//! - committed statements are recorded for assertions
//! - failures can be scripted per operation
//!
//! ```rust,ignore
//! use ingot_core::test_support::MockGraphStore;
//! use ingot_core::{GraphStore, Mutation, StoreError, StoreTransaction};
//!
//! # async fn example() -> Result<(), StoreError> {
//! let store = MockGraphStore::new();
//! store.fail_next_commits([StoreError::aborted("conflict")]);
//!
//! let mut txn = store.begin();
//! txn.mutate(&Mutation::set("<0x1> <name> \"Ada\" .")).await?;
//! assert!(txn.commit().await.is_err());
//! txn.discard().await;
//!
//! assert_eq!(store.stats().discard_count, 1);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::store::{
    GraphStore, Mutation, MutationResponse, StoreError, StoreResult, StoreTransaction,
};

/// Operation counters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MockStoreStats {
    pub query_count: usize,
    pub alter_count: usize,
    pub begin_count: usize,
    pub mutate_count: usize,
    pub upsert_count: usize,
    pub commit_count: usize,
    pub discard_count: usize,
}

#[derive(Debug, Default)]
struct MockStoreState {
    /// label -> uid
    xids: HashMap<String, String>,
    next_uid: u64,
    committed: Vec<String>,
    schemas: Vec<String>,
    queries: Vec<String>,
    query_failures: VecDeque<StoreError>,
    mutate_failures: VecDeque<StoreError>,
    commit_failures: VecDeque<StoreError>,
    latency: Duration,
    /// Upserts leave unknown labels out of the response
    withhold_new_uids: bool,
    stats: MockStoreStats,
}

impl MockStoreState {
    fn allocate_uid(&mut self) -> String {
        self.next_uid += 1;
        format!("{:#x}", self.next_uid)
    }
}

/// In-memory [`GraphStore`] with call tracking and error injection
#[derive(Debug, Clone)]
pub struct MockGraphStore {
    state: Arc<Mutex<MockStoreState>>,
}

impl Default for MockGraphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGraphStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockStoreState {
                latency: Duration::from_micros(250),
                ..MockStoreState::default()
            })),
        }
    }

    /// Store that already knows some identifiers
    pub fn with_identifiers<I, K, V>(identifiers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap();
            for (label, uid) in identifiers {
                let uid = uid.into();
                if let Some(n) = parse_uid(&uid) {
                    state.next_uid = state.next_uid.max(n);
                }
                state.xids.insert(label.into(), uid);
            }
        }
        store
    }

    pub fn stats(&self) -> MockStoreStats {
        self.state.lock().unwrap().stats.clone()
    }

    /// Statements committed so far, in commit order
    pub fn committed(&self) -> Vec<String> {
        self.state.lock().unwrap().committed.clone()
    }

    /// Identifier known for a label
    pub fn identifier(&self, label: &str) -> Option<String> {
        self.state.lock().unwrap().xids.get(label).cloned()
    }

    pub fn identifier_count(&self) -> usize {
        self.state.lock().unwrap().xids.len()
    }

    /// Schemas passed to `alter`
    pub fn schemas(&self) -> Vec<String> {
        self.state.lock().unwrap().schemas.clone()
    }

    /// Query texts passed to `query`
    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    pub fn set_latency(&self, latency: Duration) {
        self.state.lock().unwrap().latency = latency;
    }

    /// Answer upserts of unknown labels with an empty query block and no
    /// allocated uid, like a store that silently skipped the mutation
    pub fn withhold_new_uids(&self) {
        self.state.lock().unwrap().withhold_new_uids = true;
    }

    /// Fail the next `query` calls with these errors, in order
    pub fn fail_next_queries(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.state.lock().unwrap().query_failures.extend(errors);
    }

    /// Fail the next `mutate` calls with these errors, in order
    pub fn fail_next_mutations(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.state.lock().unwrap().mutate_failures.extend(errors);
    }

    /// Fail the next `commit` calls with these errors, in order
    pub fn fail_next_commits(&self, errors: impl IntoIterator<Item = StoreError>) {
        self.state.lock().unwrap().commit_failures.extend(errors);
    }
}

#[async_trait]
impl GraphStore for MockGraphStore {
    async fn query(&self, query: &str) -> StoreResult<Value> {
        let mut state = self.state.lock().unwrap();
        state.stats.query_count += 1;
        state.queries.push(query.to_string());
        if let Some(err) = state.query_failures.pop_front() {
            return Err(err);
        }

        let predicate = between(query, "has(", ")").unwrap_or("xid").trim().to_string();
        let first = number_after(query, "first:").unwrap_or(usize::MAX);
        let after = between(query, "after:", ")")
            .and_then(|s| parse_uid(s.trim()))
            .unwrap_or(0);

        let mut nodes: Vec<(u64, &String, &String)> = state
            .xids
            .iter()
            .filter_map(|(label, uid)| parse_uid(uid).map(|n| (n, label, uid)))
            .filter(|(n, _, _)| *n > after)
            .collect();
        nodes.sort_by_key(|(n, _, _)| *n);

        let page: Vec<Value> = nodes
            .into_iter()
            .take(first)
            .map(|(_, label, uid)| {
                let mut node = serde_json::Map::new();
                node.insert(predicate.clone(), json!(label));
                node.insert("uid".to_string(), json!(uid));
                Value::Object(node)
            })
            .collect();
        Ok(json!({ "xidmap": page }))
    }

    async fn alter(&self, schema: &str) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.stats.alter_count += 1;
        state.schemas.push(schema.to_string());
        Ok(())
    }

    fn begin(&self) -> Box<dyn StoreTransaction> {
        self.state.lock().unwrap().stats.begin_count += 1;
        Box::new(MockTransaction {
            state: Arc::clone(&self.state),
            pending_lines: Vec::new(),
            pending_xids: Vec::new(),
        })
    }
}

struct MockTransaction {
    state: Arc<Mutex<MockStoreState>>,
    pending_lines: Vec<String>,
    pending_xids: Vec<(String, String)>,
}

#[async_trait]
impl StoreTransaction for MockTransaction {
    async fn mutate(&mut self, mutation: &Mutation) -> StoreResult<MutationResponse> {
        let mut state = self.state.lock().unwrap();
        state.stats.mutate_count += 1;
        if let Some(err) = state.mutate_failures.pop_front() {
            return Err(err);
        }

        let mut response = MutationResponse {
            queries: json!({}),
            latency: state.latency,
            ..MutationResponse::default()
        };

        match &mutation.query {
            Some(query) => {
                state.stats.upsert_count += 1;
                let mut queries = serde_json::Map::new();
                for (alias, label) in upsert_blocks(query) {
                    let matched = state
                        .xids
                        .get(&label)
                        .or_else(|| {
                            self.pending_xids
                                .iter()
                                .find(|(l, _)| *l == label)
                                .map(|(_, uid)| uid)
                        })
                        .cloned();
                    match matched {
                        Some(uid) => {
                            queries.insert(alias, json!([{ "uid": uid }]));
                        }
                        None if state.withhold_new_uids => {
                            queries.insert(alias, json!([]));
                        }
                        None => {
                            let uid = state.allocate_uid();
                            response.uids.insert(format!("uid({alias})"), uid.clone());
                            self.pending_xids.push((label, uid));
                            queries.insert(alias, json!([]));
                        }
                    }
                }
                response.queries = Value::Object(queries);
            }
            None => {
                self.pending_lines.extend(
                    mutation
                        .set_nquads
                        .lines()
                        .filter(|l| !l.trim().is_empty())
                        .map(str::to_string),
                );
            }
        }
        Ok(response)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let mut state = self.state.lock().unwrap();
        state.stats.commit_count += 1;
        if let Some(err) = state.commit_failures.pop_front() {
            return Err(err);
        }
        state.committed.append(&mut self.pending_lines);
        for (label, uid) in self.pending_xids.drain(..) {
            state.xids.insert(label, uid);
        }
        Ok(())
    }

    async fn discard(&mut self) {
        self.state.lock().unwrap().stats.discard_count += 1;
        self.pending_lines.clear();
        self.pending_xids.clear();
    }
}

fn parse_uid(uid: &str) -> Option<u64> {
    u64::from_str_radix(uid.strip_prefix("0x")?, 16).ok()
}

fn between<'a>(text: &'a str, start: &str, end: &str) -> Option<&'a str> {
    let from = text.find(start)? + start.len();
    let rest = &text[from..];
    let to = rest.find(end)?;
    Some(&rest[..to])
}

fn number_after(text: &str, marker: &str) -> Option<usize> {
    let from = text.find(marker)? + marker.len();
    let digits: String = text[from..]
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// `(alias, label)` pairs of `alias as alias(func: eq(pred, "label"))` blocks
fn upsert_blocks(query: &str) -> Vec<(String, String)> {
    query
        .lines()
        .filter_map(|line| {
            let (alias, rest) = line.trim().split_once(" as ")?;
            let label = between(rest, "\"", "\"")?;
            Some((alias.trim().to_string(), label.to_string()))
        })
        .collect()
}
