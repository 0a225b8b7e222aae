mod common;

use common::{product_xml, MockRoute, MockServer};
use prestashop_meta_sync::{build_client, ProductRecord, RecordPatcher, SyncConfig, SyncError};
use std::time::Duration;

async fn patcher_for(routes: Vec<MockRoute>) -> (MockServer, RecordPatcher) {
    let server = MockServer::start(routes).await;
    let config = SyncConfig::new(
        &format!("{}/api/", server.base_url),
        "WSKEY",
        &server.base_url,
        "sk-test",
    )
    .unwrap()
    .with_timeout(Duration::from_secs(5));
    let client = build_client(&config.user_agent, config.timeout).unwrap();
    let patcher = RecordPatcher::new(&config, client);
    (server, patcher)
}

#[tokio::test]
async fn test_fetch_strip_and_submit_round_trip() {
    let (server, patcher) = patcher_for(vec![
        MockRoute::new(
            "GET",
            "/api/products/12",
            200,
            &product_xml("Prodigal Pen", "<p>Sampar - formula</p>"),
        ),
        MockRoute::new("PUT", "/api/products/12", 200, ""),
    ])
    .await;

    let mut record = patcher.fetch(12).await.unwrap();
    assert!(record.has_field("manufacturer_name"));
    assert_eq!(RecordPatcher::strip_non_writable(&mut record), 3);

    patcher
        .apply_and_submit(12, record, "Title", "Description", "slug")
        .await
        .unwrap();

    let puts = server.requests_with_method("PUT");
    assert_eq!(puts.len(), 1);
    let sent = ProductRecord::parse(puts[0].body.as_bytes()).unwrap();
    assert_eq!(sent.language_texts("meta_title"), vec!["Title", "Title"]);
    assert_eq!(
        sent.language_texts("meta_description"),
        vec!["Description", "Description"]
    );
    assert_eq!(sent.language_texts("link_rewrite"), vec!["slug", "slug"]);
    assert_eq!(
        sent.language_texts("name"),
        vec!["Prodigal Pen", "Prodigal Pen"]
    );
    assert!(!sent.has_field("quantity"));
    assert!(!sent.has_field("position_in_category"));
}

#[tokio::test]
async fn test_rejected_write_with_unreadable_body_keeps_status() {
    let (_server, patcher) = patcher_for(vec![
        MockRoute::new(
            "GET",
            "/api/products/12",
            200,
            &product_xml("Prodigal Pen", "<p>Sampar - formula</p>"),
        ),
        MockRoute::new("PUT", "/api/products/12", 500, "<errors>partial").truncated(),
    ])
    .await;

    let record = patcher.fetch(12).await.unwrap();
    match patcher
        .apply_and_submit(12, record, "Title", "Description", "slug")
        .await
    {
        Err(SyncError::WriteRejected { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "");
        }
        other => panic!("Expected WriteRejected, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_other_status_is_read_failure() {
    let (_server, patcher) = patcher_for(vec![MockRoute::new(
        "GET",
        "/api/products/12",
        503,
        "maintenance",
    )])
    .await;

    match patcher.fetch(12).await {
        Err(SyncError::ReadFailure { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("Expected ReadFailure, got: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_malformed_record() {
    let (_server, patcher) = patcher_for(vec![MockRoute::new(
        "GET",
        "/api/products/12",
        200,
        "<prestashop><product>",
    )])
    .await;

    assert!(matches!(
        patcher.fetch(12).await,
        Err(SyncError::XmlParseError(_))
    ));
}

#[tokio::test]
async fn test_unreachable_platform_is_transport_error() {
    let config = SyncConfig::new("http://127.0.0.1:9/api", "WSKEY", "http://127.0.0.1:9", "")
        .unwrap();
    let client = build_client(&config.user_agent, Some(Duration::from_secs(2))).unwrap();
    let patcher = RecordPatcher::new(&config, client);

    assert!(matches!(
        patcher.fetch(12).await,
        Err(SyncError::TransportError(_))
    ));
}
