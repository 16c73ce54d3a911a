//! Dgraph HTTP store

use crate::response::{decode, Envelope};
use crate::transaction::DgraphTransaction;
use async_trait::async_trait;
use ingot_config::StoreConfig;
use ingot_core::{GraphStore, StoreError, StoreResult, StoreTransaction};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

const AUTH_HEADER: &str = "X-Auth-Token";

/// Body of a request to a Dgraph endpoint
pub(crate) enum Body {
    Text {
        content_type: &'static str,
        text: String,
    },
    Json(Value),
}

/// Shared HTTP plumbing for the store and its transactions
#[derive(Debug)]
pub(crate) struct HttpClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpClient {
    /// POST to `path` (which may carry a query string) and decode the envelope
    pub(crate) async fn post(&self, path: &str, body: Body) -> StoreResult<Envelope> {
        let url = format!("{}{}", self.endpoint, path);
        debug!(%url, "Dgraph request");

        let mut request = self.client.post(&url);
        if let Some(key) = &self.api_key {
            request = request.header(AUTH_HEADER, key);
        }
        request = match body {
            Body::Text { content_type, text } => request.header(CONTENT_TYPE, content_type).body(text),
            Body::Json(value) => request.json(&value),
        };

        let response = request
            .send()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| StoreError::network(e.to_string()))?;
        decode(status, &text)
    }
}

/// [`GraphStore`] backed by a Dgraph alpha's HTTP API
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct DgraphStore {
    http: Arc<HttpClient>,
}

impl DgraphStore {
    /// Build a store with its own HTTP client
    pub fn new(config: &StoreConfig) -> StoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| StoreError::network(e.to_string()))?;
        Ok(Self::with_client(client, config))
    }

    /// Build a store around an existing HTTP client
    pub fn with_client(client: Client, config: &StoreConfig) -> Self {
        Self {
            http: Arc::new(HttpClient {
                client,
                endpoint: config.endpoint.trim_end_matches('/').to_string(),
                api_key: config.api_key.clone(),
            }),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.http.endpoint
    }

    /// Start a transaction with the concrete type
    pub fn transaction(&self) -> DgraphTransaction {
        DgraphTransaction::new(Arc::clone(&self.http))
    }
}

#[async_trait]
impl GraphStore for DgraphStore {
    async fn query(&self, query: &str) -> StoreResult<Value> {
        let body = Body::Text {
            content_type: "application/dql",
            text: query.to_string(),
        };
        let envelope = self.http.post("/query", body).await?;
        Ok(envelope.data)
    }

    async fn alter(&self, schema: &str) -> StoreResult<()> {
        let body = Body::Text {
            content_type: "text/plain",
            text: schema.to_string(),
        };
        self.http.post("/alter", body).await?;
        debug!("Schema altered");
        Ok(())
    }

    fn begin(&self) -> Box<dyn StoreTransaction> {
        Box::new(self.transaction())
    }
}
