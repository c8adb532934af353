//! Tests for the Google Sheets values adapter.

use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{column_range, SheetsStore, TabularStore};
use crate::error::SyncError;

#[test]
fn column_range_formats_a1_notation() {
    assert_eq!(column_range("B", 9, 42), "B9:B42");
    assert_eq!(column_range("M", 4, 4), "M4:M4");
}

#[tokio::test]
async fn read_returns_string_matrix() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "range": "Sheet1!M4",
        "majorDimension": "ROWS",
        "values": [["100,00€"], [42]]
    });

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/M4:M4"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let store = SheetsStore::with_base_url(server.uri(), "sheet-1", "tok");
    let values = store.read("M4:M4").await.unwrap();

    assert_eq!(values.len(), 2);
    assert_eq!(values[0][0], "100,00€");
    // Non-string cells come back stringified
    assert_eq!(values[1][0], "42");
}

#[tokio::test]
async fn read_of_untouched_range_is_empty() {
    let server = MockServer::start().await;

    // The API omits "values" entirely for a range that was never written.
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "range": "G2:G2" })),
        )
        .mount(&server)
        .await;

    let store = SheetsStore::with_base_url(server.uri(), "sheet-1", "tok");
    let values = store.read("G2:G2").await.unwrap();
    assert!(values.is_empty());
}

#[tokio::test]
async fn read_http_error_is_a_store_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let store = SheetsStore::with_base_url(server.uri(), "sheet-1", "tok");
    match store.read("M4:M4").await {
        Err(SyncError::Store(msg)) => assert!(msg.contains("403"), "got: {msg}"),
        other => panic!("Expected Store error, got: {other:?}"),
    }
}

#[tokio::test]
async fn write_sends_user_entered_values() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/v4/spreadsheets/sheet-1/values/B9:B10"))
        .and(query_param("valueInputOption", "USER_ENTERED"))
        .and(header("authorization", "Bearer tok"))
        .and(body_partial_json(serde_json::json!({
            "values": [["AK-47 | Redline"], ["AWP | Asiimov"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let store = SheetsStore::with_base_url(server.uri(), "sheet-1", "tok");
    store
        .write(
            "B9:B10",
            vec![
                vec!["AK-47 | Redline".to_string()],
                vec!["AWP | Asiimov".to_string()],
            ],
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn write_http_error_is_a_store_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let store = SheetsStore::with_base_url(server.uri(), "sheet-1", "tok");
    let result = store.write("M2:M2", vec![vec!["x".to_string()]]).await;
    assert!(matches!(result, Err(SyncError::Store(_))));
}

#[tokio::test]
async fn probe_reads_header_row() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/spreadsheets/sheet-1/values/A1:Z1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "values": [["hi"]] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = SheetsStore::with_base_url(server.uri(), "sheet-1", "tok");
    store.probe().await.unwrap();
}
