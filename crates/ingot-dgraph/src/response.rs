//! Dgraph HTTP response envelope
//!
//! Every endpoint answers with `{ "data": ..., "errors": [...], "extensions": {...} }`.
//! Errors usually arrive with status 200, so classification looks at the
//! body before the status code.

use ingot_core::{StoreError, StoreResult};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

const ABORTED_MESSAGE: &str = "Transaction has been aborted";
const ABORTED_CODE: &str = "ErrorAborted";

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Envelope {
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub errors: Vec<ApiError>,
    #[serde(default)]
    pub extensions: Extensions,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorExtensions {
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct Extensions {
    #[serde(default)]
    pub server_latency: Option<ServerLatency>,
    #[serde(default)]
    pub txn: Option<TxnContext>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ServerLatency {
    #[serde(default)]
    pub total_ns: u64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct TxnContext {
    #[serde(default)]
    pub start_ts: u64,
    #[serde(default)]
    pub keys: Vec<String>,
    #[serde(default)]
    pub preds: Vec<String>,
}

impl ApiError {
    fn is_aborted(&self) -> bool {
        self.message.contains(ABORTED_MESSAGE)
            || self
                .extensions
                .as_ref()
                .and_then(|e| e.code.as_deref())
                .is_some_and(|code| code == ABORTED_CODE)
    }
}

impl Envelope {
    pub fn latency(&self) -> Duration {
        self.extensions
            .server_latency
            .as_ref()
            .map(|l| Duration::from_nanos(l.total_ns))
            .unwrap_or_default()
    }

    fn error(&self) -> Option<StoreError> {
        if self.errors.is_empty() {
            return None;
        }
        let message = self
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        Some(if self.errors.iter().any(ApiError::is_aborted) {
            StoreError::Aborted(message)
        } else {
            StoreError::Rejected(message)
        })
    }
}

/// Classify a raw HTTP response
pub(crate) fn decode(status: u16, body: &str) -> StoreResult<Envelope> {
    let parsed = serde_json::from_str::<Envelope>(body);

    if !(200..300).contains(&status) {
        if let Some(err) = parsed.as_ref().ok().and_then(Envelope::error) {
            if err.is_conflict() {
                return Err(err);
            }
        }
        return Err(StoreError::Http {
            status,
            body: body.to_string(),
        });
    }

    let envelope = parsed?;
    match envelope.error() {
        Some(err) => Err(err),
        None => Ok(envelope),
    }
}
