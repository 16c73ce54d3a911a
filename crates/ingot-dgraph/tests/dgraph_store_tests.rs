//! Transaction flow against a mocked Dgraph alpha

use ingot_config::StoreConfig;
use ingot_core::{GraphStore, Mutation, StoreError, StoreTransaction};
use ingot_dgraph::DgraphStore;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const MUTATE_OK: &str = r#"{
    "data": {"code": "Success", "message": "Done", "queries": null, "uids": {}},
    "extensions": {
        "server_latency": {"total_ns": 2000000},
        "txn": {"start_ts": 42, "keys": ["k1"], "preds": ["1-name"]}
    }
}"#;

const COMMIT_OK: &str =
    r#"{"data": {"code": "Success", "message": "Done"}, "extensions": {"txn": {"start_ts": 42, "commit_ts": 43}}}"#;

const ABORTED: &str =
    r#"{"errors": [{"message": "Transaction has been aborted. Please retry", "extensions": {"code": "ErrorAborted"}}]}"#;

fn store(server: &MockServer) -> DgraphStore {
    DgraphStore::new(&StoreConfig {
        endpoint: server.uri(),
        ..StoreConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn test_mutate_then_commit_uses_start_ts() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mutate"))
        .and(body_string_contains("set {"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MUTATE_OK))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/commit"))
        .and(query_param("startTs", "42"))
        .and(body_string_contains("1-name"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMMIT_OK))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = store(&mock_server);
    let mut txn = store.begin();
    let response = txn
        .mutate(&Mutation::set("<0x1> <name> \"Ada\" ."))
        .await
        .unwrap();
    assert_eq!(response.latency, Duration::from_millis(2));

    txn.commit().await.unwrap();
    // already committed: no abort request goes out
    txn.discard().await;
}

#[tokio::test]
async fn test_upsert_response_exposes_uids_and_queries() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mutate"))
        .and(body_string_contains("upsert {"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "data": {
                    "code": "Success",
                    "queries": {"u_0": [], "u_1": [{"uid": "0x9"}]},
                    "uids": {"uid(u_0)": "0x2a"}
                },
                "extensions": {"txn": {"start_ts": 5}}
            }"#,
        ))
        .mount(&mock_server)
        .await;

    let store = store(&mock_server);
    let mut txn = store.transaction();
    let response = txn
        .mutate(&Mutation::upsert(
            "{\nu_0 as u_0(func: eq(xid, \"_:a\")) { uid }\nu_1 as u_1(func: eq(xid, \"_:b\")) { uid }\n}",
            "uid(u_0) <xid> \"_:a\" .\nuid(u_1) <xid> \"_:b\" .",
        ))
        .await
        .unwrap();

    assert_eq!(txn.start_ts(), Some(5));
    assert_eq!(response.uids.get("uid(u_0)").map(String::as_str), Some("0x2a"));
    assert_eq!(response.queries["u_1"][0]["uid"], "0x9");
}

#[tokio::test]
async fn test_conflict_on_commit_is_aborted_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mutate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(MUTATE_OK))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/commit"))
        .and(query_param("abort", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_string(COMMIT_OK))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/commit"))
        .respond_with(ResponseTemplate::new(200).set_body_string(ABORTED))
        .mount(&mock_server)
        .await;

    let store = store(&mock_server);
    let mut txn = store.begin();
    txn.mutate(&Mutation::set("<0x1> <name> \"Ada\" ."))
        .await
        .unwrap();

    let err = txn.commit().await.unwrap_err();
    assert!(err.is_conflict());
    txn.discard().await;
}

#[tokio::test]
async fn test_rejected_mutation() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/mutate"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"errors": [{"message": "while lexing <0x1> <name", "extensions": {"code": "ErrorInvalidRequest"}}]}"#,
        ))
        .mount(&mock_server)
        .await;

    let store = store(&mock_server);
    let mut txn = store.begin();
    let err = txn
        .mutate(&Mutation::set("<0x1> <name"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Rejected(msg) if msg.contains("lexing")));
}

#[tokio::test]
async fn test_discard_without_mutation_sends_nothing() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let store = store(&mock_server);
    let mut txn = store.begin();
    txn.discard().await;
    txn.commit().await.unwrap();
}

#[tokio::test]
async fn test_server_error_status() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&mock_server)
        .await;

    let err = store(&mock_server).query("{ q() { uid } }").await.unwrap_err();
    assert_eq!(
        err,
        StoreError::Http {
            status: 503,
            body: "overloaded".to_string()
        }
    );
}
