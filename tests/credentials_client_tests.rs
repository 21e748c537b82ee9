// Integration tests for the connection-details HTTP client

use knect_meet::credentials::CredentialRequest;
use knect_meet::error::CredentialError;
use knect_meet::{CredentialProvider, HttpCredentialClient};
use std::collections::HashMap;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(region: Option<&str>) -> CredentialRequest {
    CredentialRequest {
        room_name: "abcd-1234".to_string(),
        participant_name: "alice".to_string(),
        metadata: Some(r#"{"inputLang":"en","outputLang":"hi","gender":"female"}"#.to_string()),
        region: region.map(str::to_string),
    }
}

fn client(server: &MockServer) -> HttpCredentialClient {
    HttpCredentialClient::new(
        &format!("{}/api/connection-details", server.uri()),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn test_fetch_sends_query_and_parses_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/connection-details"))
        .and(query_param("roomName", "abcd-1234"))
        .and(query_param("participantName", "alice"))
        .and(query_param(
            "metadata",
            r#"{"inputLang":"en","outputLang":"hi","gender":"female"}"#,
        ))
        .and(query_param("region", "eu-west"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "serverUrl": "wss://media.example.com",
            "participantToken": "signed.jwt.token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let details = client(&server)
        .fetch(&request(Some("eu-west")))
        .await
        .unwrap();

    assert_eq!(details.server_url, "wss://media.example.com");
    assert_eq!(details.participant_token, "signed.jwt.token");
}

#[tokio::test]
async fn test_fetch_omits_region_when_unset() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/connection-details"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "serverUrl": "wss://media.example.com",
            "participantToken": "t"
        })))
        .mount(&server)
        .await;

    client(&server).fetch(&request(None)).await.unwrap();

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1);
    let query: HashMap<String, String> = received[0].url.query_pairs().into_owned().collect();
    assert_eq!(query.get("participantName").map(String::as_str), Some("alice"));
    assert!(!query.contains_key("region"));
}

#[tokio::test]
async fn test_fetch_error_status_carries_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/connection-details"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(serde_json::json!({"error": "Missing required parameters"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).fetch(&request(None)).await.unwrap_err();

    match err {
        CredentialError::RequestFailed { status, body } => {
            assert_eq!(status, 400);
            assert!(body.contains("Missing required parameters"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_rejects_malformed_details() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client(&server).fetch(&request(None)).await.unwrap_err();

    assert!(matches!(err, CredentialError::Http(_)));
}

#[tokio::test]
async fn test_fetch_unreachable_service() {
    let client =
        HttpCredentialClient::new("http://127.0.0.1:1/api/connection-details", Duration::from_secs(2))
            .unwrap();

    let err = client.fetch(&request(None)).await.unwrap_err();

    assert!(matches!(err, CredentialError::Http(_)));
}
