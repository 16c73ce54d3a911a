//! Dgraph HTTP transactions
//!
//! The HTTP API is stateless: a transaction is its `start_ts` plus the
//! conflict keys and predicates returned by each mutation. The first
//! mutation opens the transaction; later requests carry `startTs`.

use crate::client::{Body, HttpClient};
use async_trait::async_trait;
use ingot_core::{Mutation, MutationResponse, StoreResult, StoreTransaction};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// A read-write transaction against a Dgraph alpha
#[derive(Debug)]
pub struct DgraphTransaction {
    http: Arc<HttpClient>,
    start_ts: Option<u64>,
    keys: Vec<String>,
    preds: Vec<String>,
    finished: bool,
}

impl DgraphTransaction {
    pub(crate) fn new(http: Arc<HttpClient>) -> Self {
        Self {
            http,
            start_ts: None,
            keys: Vec::new(),
            preds: Vec::new(),
            finished: false,
        }
    }

    /// Start timestamp, once the first mutation has been sent
    pub fn start_ts(&self) -> Option<u64> {
        self.start_ts
    }

    fn merge_context(&mut self, start_ts: u64, keys: Vec<String>, preds: Vec<String>) {
        if self.start_ts.is_none() && start_ts != 0 {
            self.start_ts = Some(start_ts);
        }
        for key in keys {
            if !self.keys.contains(&key) {
                self.keys.push(key);
            }
        }
        for pred in preds {
            if !self.preds.contains(&pred) {
                self.preds.push(pred);
            }
        }
    }
}

/// RDF request body for `/mutate`
pub(crate) fn mutation_body(mutation: &Mutation) -> String {
    let nquads = mutation.set_nquads.trim_end();
    match &mutation.query {
        Some(query) => format!(
            "upsert {{\n  query {}\n  mutation {{\n    set {{\n{}\n    }}\n  }}\n}}",
            query.trim(),
            nquads
        ),
        None => format!("{{\n  set {{\n{}\n  }}\n}}", nquads),
    }
}

fn string_map(value: &Value) -> HashMap<String, String> {
    value
        .as_object()
        .map(|map| {
            map.iter()
                .filter_map(|(k, v)| v.as_str().map(|uid| (k.clone(), uid.to_string())))
                .collect()
        })
        .unwrap_or_default()
}

#[async_trait]
impl StoreTransaction for DgraphTransaction {
    async fn mutate(&mut self, mutation: &Mutation) -> StoreResult<MutationResponse> {
        let path = match self.start_ts {
            Some(ts) => format!("/mutate?startTs={ts}"),
            None => "/mutate".to_string(),
        };
        let body = Body::Text {
            content_type: "application/rdf",
            text: mutation_body(mutation),
        };
        let envelope = self.http.post(&path, body).await?;

        let latency = envelope.latency();
        if let Some(txn) = envelope.extensions.txn {
            self.merge_context(txn.start_ts, txn.keys, txn.preds);
        }

        let uids = string_map(&envelope.data["uids"]);
        let queries = match envelope.data.get("queries") {
            Some(Value::Object(map)) => Value::Object(map.clone()),
            _ => json!({}),
        };
        debug!(start_ts = ?self.start_ts, new_uids = uids.len(), "Mutation applied");

        Ok(MutationResponse {
            uids,
            queries,
            latency,
        })
    }

    async fn commit(&mut self) -> StoreResult<()> {
        if self.finished {
            return Ok(());
        }
        let Some(ts) = self.start_ts else {
            self.finished = true;
            return Ok(());
        };
        let body = Body::Json(json!({ "keys": self.keys, "preds": self.preds }));
        self.http.post(&format!("/commit?startTs={ts}"), body).await?;
        self.finished = true;
        debug!(start_ts = ts, "Transaction committed");
        Ok(())
    }

    async fn discard(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        let Some(ts) = self.start_ts else {
            return;
        };
        let body = Body::Json(json!({ "keys": self.keys, "preds": self.preds }));
        match self
            .http
            .post(&format!("/commit?startTs={ts}&abort=true"), body)
            .await
        {
            Ok(_) => debug!(start_ts = ts, "Transaction discarded"),
            Err(e) => warn!(start_ts = ts, error = %e, "Failed to abort transaction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DgraphStore;
    use ingot_config::StoreConfig;
    use tracing_test::traced_test;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_plain_mutation_body() {
        let body = mutation_body(&Mutation::set("<0x1> <name> \"Ada\" .\n"));
        assert_eq!(body, "{\n  set {\n<0x1> <name> \"Ada\" .\n  }\n}");
    }

    #[test]
    fn test_upsert_mutation_body() {
        let body = mutation_body(&Mutation::upsert(
            "{\nu_0 as u_0(func: eq(xid, \"_:a\")) { uid }\n}",
            "uid(u_0) <xid> \"_:a\" .",
        ));
        assert!(body.starts_with("upsert {\n  query {\nu_0 as u_0"));
        assert!(body.contains("mutation {\n    set {\nuid(u_0) <xid> \"_:a\" .\n    }"));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failed_abort_is_logged_not_raised() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/mutate"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data": {"code": "Success", "uids": {}}, "extensions": {"txn": {"start_ts": 7}}}"#,
            ))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/commit"))
            .and(query_param("abort", "true"))
            .respond_with(ResponseTemplate::new(500).set_body_string("down"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = DgraphStore::new(&StoreConfig {
            endpoint: mock_server.uri(),
            ..StoreConfig::default()
        })
        .unwrap();
        let mut txn = store.transaction();
        txn.mutate(&Mutation::set("<0x1> <name> \"Ada\" ."))
            .await
            .unwrap();
        txn.discard().await;
        txn.discard().await;

        assert!(logs_contain("Failed to abort transaction"));
    }

    #[test]
    fn test_string_map_ignores_non_strings() {
        let map = string_map(&json!({"uid(u_0)": "0x1", "bad": 3}));
        assert_eq!(map.len(), 1);
        assert_eq!(map["uid(u_0)"], "0x1");
        assert!(string_map(&Value::Null).is_empty());
    }
}
