//! Wiremock integration tests for the reqwest transport and the full client.

use std::time::Duration;

use godpanel::platform::{AUTH_TOKEN_KEY, MemoryStore, KeyValueStore};
use godpanel::transport::{HttpRequest, ReqwestTransport, Transport};
use godpanel::types::RequestDescriptor;
use godpanel::{ApiClient, ClientConfig, ErrorKind, RetryPolicy};
use serde_json::{Value, json};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport_for(server: &MockServer) -> ReqwestTransport {
    ReqwestTransport::new(&ClientConfig::new().base_url(server.uri())).unwrap()
}

// =========================================================================
// ReqwestTransport
// =========================================================================

#[tokio::test]
async fn sends_default_headers_and_query() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .and(query_param("page", "2"))
        .and(query_param("role", "admin"))
        .and(header("Accept", "application/json"))
        .and(header("X-Requested-With", "XMLHttpRequest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let request = RequestDescriptor::get("/users")
        .param("page", 2)
        .param("role", "admin");
    let response = transport_for(&server)
        .send(&HttpRequest::from(&request))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body, json!([{"id": "1"}]));
}

#[tokio::test]
async fn sends_user_agent_and_configured_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .and(header("X-Tenant", "acme"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let config = ClientConfig::new()
        .base_url(server.uri())
        .header("X-Tenant", "acme");
    let transport = ReqwestTransport::new(&config).unwrap();
    let response = transport
        .send(&HttpRequest::from(&RequestDescriptor::get("/health")))
        .await
        .unwrap();
    assert_eq!(response.status, 204);
    assert_eq!(response.body, Value::Null);

    let received = server.received_requests().await.unwrap();
    let agent = received[0].headers.get("user-agent").unwrap().to_str().unwrap();
    assert!(agent.starts_with("godpanel/"));
}

#[tokio::test]
async fn sends_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/users/bulk/activate"))
        .and(body_json(json!({"userIds": ["a", "b"]})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let request = RequestDescriptor::patch("/users/bulk/activate").body(json!({"userIds": ["a", "b"]}));
    let response = transport_for(&server)
        .send(&HttpRequest::from(&request))
        .await
        .unwrap();
    assert!(response.is_success());
}

#[tokio::test]
async fn error_statuses_are_responses_not_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "gone"})))
        .mount(&server)
        .await;

    let response = transport_for(&server)
        .send(&HttpRequest::from(&RequestDescriptor::get("/users/missing")))
        .await
        .unwrap();
    assert_eq!(response.status, 404);
    assert_eq!(response.body["message"], "gone");
}

#[tokio::test]
async fn non_json_body_is_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/plain"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway"))
        .mount(&server)
        .await;

    let response = transport_for(&server)
        .send(&HttpRequest::from(&RequestDescriptor::get("/plain")))
        .await
        .unwrap();
    assert_eq!(response.body, json!("Bad Gateway"));
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let config = ClientConfig::new()
        .base_url(server.uri())
        .timeout(Duration::from_millis(50));
    let err = ReqwestTransport::new(&config)
        .unwrap()
        .send(&HttpRequest::from(&RequestDescriptor::get("/slow")))
        .await
        .unwrap_err();
    assert!(err.timed_out);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_failure() {
    // Reserve a port, then free it so nothing listens there.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ClientConfig::new().base_url(format!("http://127.0.0.1:{port}"));

    let err = ReqwestTransport::new(&config)
        .unwrap()
        .send(&HttpRequest::from(&RequestDescriptor::get("/users")))
        .await
        .unwrap_err();
    assert!(!err.timed_out);
}

// =========================================================================
// Full client over HTTP
// =========================================================================

#[tokio::test]
async fn client_unwraps_envelope_and_authenticates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/stats"))
        .and(header("Authorization", "Bearer tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"totalUsers": 42}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(AUTH_TOKEN_KEY, "tok-123").unwrap();
    let client = ApiClient::builder()
        .base_url(server.uri())
        .store(store)
        .build()
        .unwrap();

    let first = client.get::<Value>("/dashboard/stats").await.unwrap();
    let second = client.get::<Value>("/dashboard/stats").await.unwrap();
    assert_eq!(first.data, Some(json!({"totalUsers": 42})));
    assert_eq!(first, second);

    let received = server.received_requests().await.unwrap();
    assert_eq!(received.len(), 1, "second read served from cache");
    assert!(received[0].url.query_pairs().any(|(k, _)| k == "_t"));
}

#[tokio::test]
async fn client_retries_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dashboard/overview"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/dashboard/overview"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": 1})))
        .mount(&server)
        .await;

    let client = ApiClient::new(
        ClientConfig::new()
            .base_url(server.uri())
            .retry(RetryPolicy::new().base_delay(Duration::from_millis(10))),
    )
    .unwrap();

    let response = client.get::<Value>("/dashboard/overview").await.unwrap();
    assert_eq!(response.data, Some(json!({"ok": 1})));
    assert_eq!(server.received_requests().await.unwrap().len(), 2);
}

#[tokio::test]
async fn client_reports_unreachable_backend() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let client = ApiClient::new(ClientConfig::new().base_url(format!("http://127.0.0.1:{port}")))
        .unwrap();

    let err = client.get::<Value>("/users").await.unwrap_err();
    assert_eq!(err.kind(), Some(ErrorKind::Network));
}
