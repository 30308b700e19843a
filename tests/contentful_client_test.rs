use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use trip_journal::adapters::contentful::fetch_until_cancelled;
use trip_journal::core::{ContentSource, EntryQuery};
use trip_journal::{ContentfulClient, JournalError};

fn client(server: &MockServer) -> ContentfulClient {
    ContentfulClient::new(server.base_url(), "space1", "staging", "token-abc")
}

fn trip_payload() -> serde_json::Value {
    json!({
        "sys": { "type": "Array" },
        "items": [{
            "sys": {
                "id": "lisbon",
                "contentType": { "sys": { "type": "Link", "linkType": "ContentType", "id": "trip" } }
            },
            "fields": {
                "title": "Lisbon",
                "date": "2024-09-15",
                "featuredImage": { "sys": { "type": "Link", "linkType": "Asset", "id": "hero" } },
                "port": { "sys": { "type": "Link", "linkType": "Entry", "id": "port-lisbon" } }
            }
        }],
        "includes": {
            "Asset": [{
                "sys": { "id": "hero", "type": "Asset" },
                "fields": { "title": "Harbour", "file": { "url": "//images.ctfassets.net/hero.jpg" } }
            }],
            "Entry": [{
                "sys": { "id": "port-lisbon", "type": "Entry" },
                "fields": { "name": "Port of Lisbon" }
            }]
        }
    })
}

#[tokio::test]
async fn test_sends_query_and_bearer_token() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/spaces/space1/environments/staging/entries")
            .query_param("content_type", "trip")
            .query_param("include", "2")
            .query_param("limit", "25")
            .header("authorization", "Bearer token-abc");
        then.status(200).json_body(trip_payload());
    });

    let query = EntryQuery::new("trip").with_limit(25).with_include(2);
    let entries = client(&server).get_entries(&query).await.unwrap();
    mock.assert();

    assert_eq!(entries.len(), 1);
    let lisbon = &entries[0];
    assert_eq!(lisbon.id, "lisbon");
    assert_eq!(lisbon.content_type, "trip");
    assert_eq!(
        lisbon.fields["featuredImage"]["fields"]["file"]["url"],
        "//images.ctfassets.net/hero.jpg"
    );
    assert_eq!(lisbon.fields["port"]["fields"]["name"], "Port of Lisbon");
}

#[tokio::test]
async fn test_error_message_taken_from_body() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(404).json_body(json!({
            "sys": { "type": "Error", "id": "NotFound" },
            "message": "The resource could not be found."
        }));
    });

    let err = client(&server)
        .get_entries(&EntryQuery::new("trip"))
        .await
        .unwrap_err();

    match err {
        JournalError::ContentApiError { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "The resource could not be found.");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_text_error_body_kept() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(503).body("upstream unavailable");
    });

    let err = client(&server)
        .get_entries(&EntryQuery::new("trip"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("upstream unavailable"));
}

#[tokio::test]
async fn test_fetch_completes_without_cancellation() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(trip_payload());
    });

    let token = CancellationToken::new();
    let entries = fetch_until_cancelled(&client(&server), &EntryQuery::new("trip"), &token)
        .await
        .unwrap();
    assert_eq!(entries.map(|entries| entries.len()), Some(1));
}

#[tokio::test]
async fn test_cancelled_fetch_discards_response() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .delay(Duration::from_secs(5))
            .json_body(trip_payload());
    });

    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let result = fetch_until_cancelled(&client(&server), &EntryQuery::new("trip"), &token)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_already_cancelled_token_skips_result() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200).json_body(trip_payload());
    });

    let token = CancellationToken::new();
    token.cancel();

    let result = fetch_until_cancelled(&client(&server), &EntryQuery::new("trip"), &token)
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_timeout_surfaces_as_api_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET);
        then.status(200)
            .delay(Duration::from_secs(3))
            .json_body(trip_payload());
    });

    let client = client(&server)
        .with_timeout(Duration::from_millis(100))
        .unwrap();
    let err = client.get_entries(&EntryQuery::new("trip")).await.unwrap_err();
    assert!(matches!(err, JournalError::ApiError(_)));
}
