#![allow(clippy::unwrap_used, clippy::float_cmp)]
// Integration tests for `SurgeClient` using wiremock.

use std::time::Duration;

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use surge_api::{Error, Method, SurgeClient, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

const API_KEY: &str = "test-key";

async fn setup() -> (MockServer, SurgeClient) {
    setup_with_timeout(Duration::from_secs(5)).await
}

async fn setup_with_timeout(timeout: Duration) -> (MockServer, SurgeClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&format!("{}/v1", server.uri())).unwrap();
    let transport = TransportConfig {
        timeout,
        ..TransportConfig::default()
    };
    let client = SurgeClient::new(base_url, &API_KEY.to_string().into(), &transport).unwrap();
    (server, client)
}

async fn mount_status(server: &MockServer, status: u16) {
    Mock::given(method("GET"))
        .and(path("/v1/profiles"))
        .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
        .mount(server)
        .await;
}

// ── Status classification ───────────────────────────────────────────

#[tokio::test]
async fn test_401_is_authentication_error() {
    let (server, client) = setup().await;
    mount_status(&server, 401).await;

    let result = client.get_profiles().await;
    assert!(
        matches!(result, Err(Error::Authentication { .. })),
        "expected Authentication error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_5xx_is_server_error() {
    for status in [500u16, 503] {
        let (server, client) = setup().await;
        mount_status(&server, status).await;

        let result = client.get_profiles().await;
        match result {
            Err(Error::Server { status: got, .. }) => assert_eq!(got, status),
            other => panic!("expected Server error for {status}, got: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_4xx_is_bad_request() {
    for status in [400u16, 404] {
        let (server, client) = setup().await;
        mount_status(&server, status).await;

        let result = client.get_profiles().await;
        match result {
            Err(Error::BadRequest { status: got, .. }) => assert_eq!(got, status),
            other => panic!("expected BadRequest error for {status}, got: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_non_json_success_is_format_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>surge</html>"))
        .mount(&server)
        .await;

    let result = client.get_profiles().await;
    match result {
        Err(Error::Format { body, .. }) => assert_eq!(body, "<html>surge</html>"),
        other => panic!("expected Format error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_wrong_json_shape_is_format_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/features/mitm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"enabled": "yes"})))
        .mount(&server)
        .await;

    let result = client.get_feature("mitm").await;
    assert!(
        matches!(result, Err(Error::Format { .. })),
        "expected Format error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_refused_connection_is_connectivity_error() {
    // Grab a free port, then close it so nothing is listening.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let base_url = SurgeClient::base_url_for("127.0.0.1", port, false).unwrap();
    let client =
        SurgeClient::new(base_url, &API_KEY.to_string().into(), &TransportConfig::default())
            .unwrap();

    let result = client.get_profiles().await;
    assert!(
        matches!(result, Err(Error::Connectivity { .. })),
        "expected Connectivity error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_timeout_is_connectivity_error() {
    let (server, client) = setup_with_timeout(Duration::from_millis(100)).await;

    Mock::given(method("GET"))
        .and(path("/v1/traffic"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"upload": 1, "download": 1}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = client.get_traffic().await.unwrap_err();
    assert!(err.is_connectivity(), "expected Connectivity error, got: {err:?}");
    assert!(err.is_timeout());
}

// ── Request shape ───────────────────────────────────────────────────

#[tokio::test]
async fn test_every_request_carries_api_key() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/profiles"))
        .and(header("X-Key", API_KEY))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"profiles": ["Home", "Work"]})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let profiles = client.get_profiles().await.unwrap();
    assert_eq!(profiles, vec!["Home".to_string(), "Work".to_string()]);
}

#[tokio::test]
async fn test_current_profile_sends_sensitive_flag() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/profiles/current"))
        .and(query_param("sensitive", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"profile_name": "Work"})))
        .expect(1)
        .mount(&server)
        .await;

    assert_eq!(client.get_current_profile().await.unwrap(), "Work");
}

#[tokio::test]
async fn test_current_profile_placeholder_when_missing() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/profiles/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    assert_eq!(client.get_current_profile().await.unwrap(), "Unknown Profile");
}

#[tokio::test]
async fn test_write_endpoints_accept_empty_bodies() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/profiles/switch"))
        .and(body_json(json!({"name": "Work"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/profiles/reload"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    client.switch_profile("Work").await.unwrap();
    client.reload_profile().await.unwrap();
}

#[tokio::test]
async fn test_generic_request_returns_raw_json() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/v1/features/mitm"))
        .and(body_json(json!({"enabled": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&server)
        .await;

    let value = client
        .request(
            Method::POST,
            &["features", "mitm"],
            Some(&json!({"enabled": true})),
            &[],
        )
        .await
        .unwrap();
    assert_eq!(value, json!({"ok": true}));
}

// ── Typed endpoints ─────────────────────────────────────────────────

#[tokio::test]
async fn test_get_traffic_converts_bytes() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/traffic"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"upload": 2048, "download": 1024})),
        )
        .mount(&server)
        .await;

    let traffic = client.get_traffic().await.unwrap();
    assert_eq!(traffic.upload, 2.0);
    assert_eq!(traffic.download, 1.0);
    assert_eq!(traffic.total, 3.0);
}

#[tokio::test]
async fn test_policy_group_names_are_encoded() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/policy_groups/Auto%20Select"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": "HK-01",
            "policies": ["HK-01", "JP-02", "DIRECT"]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/policy_groups/Auto%20Select/select"))
        .and(body_json(json!({"policy": "JP-02"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let detail = client.get_policy_group("Auto Select").await.unwrap();
    assert_eq!(detail.current, "HK-01");
    assert_eq!(detail.policies.len(), 3);

    client.select_policy("Auto Select", "JP-02").await.unwrap();
}

#[tokio::test]
async fn test_outbound_and_features() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/outbound"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mode": "rule"})))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1/outbound"))
        .and(body_json(json!({"mode": "proxy"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/features/capture"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"enabled": true})))
        .mount(&server)
        .await;

    assert_eq!(client.get_outbound_mode().await.unwrap(), "rule");
    client.set_outbound_mode("proxy").await.unwrap();
    assert!(client.get_feature("capture").await.unwrap());
}

#[tokio::test]
async fn test_missing_feature_is_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/v1/features/enhanced_mode"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client.get_feature("enhanced_mode").await.unwrap_err();
    assert!(err.is_not_found(), "got {err:?}");
}
