//! Token refresh: single-flight de-duplication and replay-once semantics.

mod support;

use serde_json::json;
use tally_api::ApiError;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use support::{authenticate, client_for};

fn user_json() -> serde_json::Value {
    json!({ "id": "u1", "email": "ada@example.com", "name": "Ada", "role": "employee" })
}

fn token_json(access: &str, refresh: &str) -> serde_json::Value {
    json!({ "access_token": access, "refresh_token": refresh, "expires_in": 900 })
}

/// Mounts a refresh endpoint handing out the given tokens.
async fn mount_refresh(server: &MockServer, access: &str, refresh: &str, expected_calls: u64) {
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json(access, refresh)))
        .expect(expected_calls)
        .mount(server)
        .await;
}

#[tokio::test]
async fn three_concurrent_401s_trigger_exactly_one_refresh() {
    let server = MockServer::start().await;

    // Requests with the stale token are rejected; the refreshed token works.
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_json()))
        .mount(&server)
        .await;
    mount_refresh(&server, "fresh", "refresh2", 1).await;

    let client = client_for(&server.uri());
    authenticate(&client, "stale", "refresh1").await;

    let auth1 = client.auth();
    let auth2 = client.auth();
    let auth3 = client.auth();
    let (a, b, c) = tokio::join!(auth1.me(), auth2.me(), auth3.me());

    assert_eq!(a.expect("first call").id, "u1");
    assert_eq!(b.expect("second call").id, "u1");
    assert_eq!(c.expect("third call").id, "u1");
    // The .expect(1) on the refresh mock verifies de-duplication on drop.
}

#[tokio::test]
async fn second_401_after_replay_is_session_expired() {
    let server = MockServer::start().await;

    // The endpoint rejects every token: the replay fails too.
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;
    mount_refresh(&server, "fresh", "refresh2", 1).await;

    let client = client_for(&server.uri());
    authenticate(&client, "stale", "refresh1").await;

    let result = client.auth().me().await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));

    // The session was cleared so the caller re-authenticates.
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn failed_refresh_is_session_expired() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/auth/me"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    authenticate(&client, "stale", "dead-refresh").await;

    let result = client.auth().me().await;
    assert!(matches!(result, Err(ApiError::SessionExpired)));
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn unauthenticated_401_does_not_refresh() {
    let server = MockServer::start().await;

    // Bad login: 401 with a payload, no refresh possible or attempted.
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "code": "invalid_credentials",
            "message": "wrong email or password"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server.uri());
    let result = client.auth().login("ada@example.com", "wrong").await;

    match result {
        Err(ApiError::Api { status, code, .. }) => {
            assert_eq!(status, 401);
            assert_eq!(code, "invalid_credentials");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn login_stores_tokens_and_logout_clears_them() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_json("access1", "refresh1")))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server.uri());

    client
        .auth()
        .login("ada@example.com", "hunter2")
        .await
        .expect("login");
    assert_eq!(
        client.session().access_token().await.as_deref(),
        Some("access1")
    );

    client.auth().logout().await.expect("logout");
    assert!(!client.session().is_authenticated().await);
}

#[tokio::test]
async fn explicit_refresh_replaces_the_session_tokens() {
    let server = MockServer::start().await;
    mount_refresh(&server, "fresh", "refresh2", 1).await;

    let client = client_for(&server.uri());
    authenticate(&client, "stale", "refresh1").await;

    let tokens = client.auth().refresh().await.expect("refresh");
    assert_eq!(tokens.access_token, "fresh");
    assert_eq!(tokens.refresh_token, "refresh2");
    assert_eq!(
        client.session().access_token().await.as_deref(),
        Some("fresh")
    );
}

#[tokio::test]
async fn explicit_refresh_without_a_session_is_not_authenticated() {
    let server = MockServer::start().await;

    let client = client_for(&server.uri());
    let result = client.auth().refresh().await;
    assert!(matches!(result, Err(ApiError::NotAuthenticated)));
}

#[tokio::test]
async fn replayed_request_carries_the_new_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .and(header("Authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/projects"))
        .and(header("Authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    mount_refresh(&server, "fresh", "refresh2", 1).await;

    let client = client_for(&server.uri());
    authenticate(&client, "stale", "refresh1").await;

    let projects = client.projects().list().await.expect("replay succeeds");
    assert!(projects.is_empty());

    // The new token pair is now the session.
    assert_eq!(
        client.session().access_token().await.as_deref(),
        Some("fresh")
    );
}
