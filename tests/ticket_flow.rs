//! Helpdesk ticket submission against a mocked Zoho Desk.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use callbridge_gateway::core::helpdesk::{
    AccessToken, OpenAISubjectExtractor, SubjectConfig, TicketCreationError, TicketFinalizer,
    ZohoConfig, ZohoDeskClient, ZohoOAuthRefresher,
};

/// Far-future expiry, epoch milliseconds (2100-01-01)
const VALID_UNTIL_MS: u64 = 4_102_444_800_000;

fn finalizer_for(server: &MockServer, seed: Option<AccessToken>) -> TicketFinalizer {
    let zoho = ZohoConfig {
        api_url: server.uri(),
        accounts_url: server.uri(),
        org_id: "org-1".to_string(),
        department_id: "dep-1".to_string(),
        client_id: "cid".to_string(),
        client_secret: "csecret".to_string(),
        refresh_token: "rtoken".to_string(),
    };

    let mut subject = SubjectConfig::new("sk-test");
    subject.api_url = format!("{}/v1/chat/completions", server.uri());

    TicketFinalizer::new(
        Arc::new(ZohoDeskClient::new(zoho.clone())),
        Arc::new(ZohoOAuthRefresher::new(zoho)),
        Arc::new(OpenAISubjectExtractor::new(subject)),
        seed,
    )
}

async fn mount_refresh(server: &MockServer, token: &str, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/oauth/v2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": token,
            "expires_in": 3600
        })))
        .expect(expected)
        .mount(server)
        .await;
}

fn invalid_oauth() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({
        "errorCode": "INVALID_OAUTH",
        "message": "The OAuth Token you provided is invalid."
    }))
}

fn created(number: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "id": "9001",
        "ticketNumber": number,
        "status": "Open"
    }))
}

#[tokio::test]
async fn test_valid_seed_token_skips_refresh() {
    let server = MockServer::start().await;
    mount_refresh(&server, "1000.unused", 0).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tickets"))
        .and(header("authorization", "Zoho-oauthtoken 1000.seed"))
        .respond_with(created("101"))
        .expect(1)
        .mount(&server)
        .await;

    let seed = AccessToken::from_epoch_millis("1000.seed", VALID_UNTIL_MS);
    let record = finalizer_for(&server, Some(seed))
        .submit_ticket("Router Down", "Caller Number: +1\n\nUser: hi", "a@example.com")
        .await
        .unwrap();

    assert_eq!(record.ticket_number.as_deref(), Some("101"));
}

#[tokio::test]
async fn test_expired_seed_token_refreshes_first() {
    let server = MockServer::start().await;
    mount_refresh(&server, "1000.fresh", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tickets"))
        .and(header("authorization", "Zoho-oauthtoken 1000.fresh"))
        .respond_with(created("102"))
        .expect(1)
        .mount(&server)
        .await;

    let seed = AccessToken::from_epoch_millis("1000.stale", 0);
    let record = finalizer_for(&server, Some(seed))
        .submit_ticket("Router Down", "Caller Number: +1", "a@example.com")
        .await
        .unwrap();

    assert_eq!(record.ticket_number.as_deref(), Some("102"));
}

#[tokio::test]
async fn test_rejected_token_refreshes_and_retries_once() {
    let server = MockServer::start().await;
    mount_refresh(&server, "1000.fresh", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tickets"))
        .and(header("authorization", "Zoho-oauthtoken 1000.revoked"))
        .respond_with(invalid_oauth())
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tickets"))
        .and(header("authorization", "Zoho-oauthtoken 1000.fresh"))
        .respond_with(created("103"))
        .expect(1)
        .mount(&server)
        .await;

    let seed = AccessToken::from_epoch_millis("1000.revoked", VALID_UNTIL_MS);
    let finalizer = finalizer_for(&server, Some(seed));

    let record = finalizer
        .submit_ticket("Router Down", "Caller Number: +1", "a@example.com")
        .await
        .unwrap();
    assert_eq!(record.ticket_number.as_deref(), Some("103"));
}

#[tokio::test]
async fn test_second_rejection_propagates() {
    let server = MockServer::start().await;
    mount_refresh(&server, "1000.fresh", 1).await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tickets"))
        .respond_with(invalid_oauth())
        .expect(2)
        .mount(&server)
        .await;

    let seed = AccessToken::from_epoch_millis("1000.seed", VALID_UNTIL_MS);
    let err = finalizer_for(&server, Some(seed))
        .submit_ticket("Router Down", "Caller Number: +1", "a@example.com")
        .await
        .unwrap_err();

    assert!(matches!(err, TicketCreationError::TokenRejected(_)));
}

#[tokio::test]
async fn test_create_ticket_extracts_subject() {
    let server = MockServer::start().await;
    mount_refresh(&server, "1000.fresh", 1).await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Internet Keeps Dropping Every Evening"},
                "finish_reason": "stop"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/tickets"))
        .and(wiremock::matchers::body_partial_json(json!({
            "subject": "Internet Keeps Dropping Every Evening"
        })))
        .respond_with(created("104"))
        .expect(1)
        .mount(&server)
        .await;

    let record = finalizer_for(&server, None)
        .create_ticket("User: my internet drops every evening", "a@example.com")
        .await
        .unwrap();

    assert_eq!(record.ticket_number.as_deref(), Some("104"));
}
