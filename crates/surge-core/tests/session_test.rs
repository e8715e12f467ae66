#![allow(clippy::unwrap_used)]
// End-to-end tests for `Session`: setup, discovery, and command dispatch.

use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

use surge_core::{
    Command, ConnectionConfig, CoreError, ErrorKind, ResourceId, ResourceKind, Session,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn config_for(server: &MockServer) -> ConnectionConfig {
    let addr = server.address();
    let mut config = ConnectionConfig::new(addr.ip().to_string(), "key".to_string().into());
    config.port = addr.port();
    config
}

/// A healthy Surge with two policy groups.
async fn mount_surge(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/profiles"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"profiles": ["Home", "Work"]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/profiles/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"profile_name": "Home"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/outbound"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"mode": "rule"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/traffic"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"upload": 2048, "download": 1024})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/features/[a-z_]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"enabled": true})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/policy_groups"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"groups": ["Proxy", "Direct"]})),
        )
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/v1/policy_groups/[A-Za-z]+$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "current": "HK-01",
            "policies": ["HK-01", "JP-02"]
        })))
        .mount(server)
        .await;
}

async fn setup() -> (MockServer, Session) {
    let server = MockServer::start().await;
    mount_surge(&server).await;
    let session = Session::setup(config_for(&server)).await.unwrap();
    (server, session)
}

// ── Setup ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_setup_fails_on_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/profiles"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let err = Session::setup(config_for(&server)).await.err().unwrap();
    assert!(matches!(err, CoreError::Setup { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[tokio::test]
async fn test_setup_tracks_everything_in_order() {
    let (_server, session) = setup().await;

    let resources = session.resources().await;
    let ids: Vec<String> = resources.iter().map(|r| r.id().to_string()).collect();
    assert_eq!(
        ids,
        vec![
            "profile:profile",
            "outbound_mode:outbound_mode",
            "traffic:traffic",
            "feature_toggle:mitm",
            "feature_toggle:capture",
            "feature_toggle:rewrite",
            "feature_toggle:scripting",
            "feature_toggle:system_proxy",
            "feature_toggle:enhanced_mode",
            "policy_group:Proxy",
            "policy_group:Direct",
        ]
    );
    assert!(resources.iter().all(|r| r.read_state().unwrap().available));

    let profile = session.resource(&ResourceId::profile()).await.unwrap();
    let state = profile.read_state().unwrap();
    assert_eq!(state.value.current(), Some("Home"));
    assert_eq!(state.value.options(), ["Home", "Work"]);

    let outbound = session.resource(&ResourceId::outbound_mode()).await.unwrap();
    assert_eq!(
        outbound.read_state().unwrap().value.options(),
        ["direct", "proxy", "rule"]
    );

    assert!(session.take_warnings().await.is_empty());
    session.shutdown().await;
}

#[tokio::test]
async fn test_discovery_is_idempotent() {
    let (server, session) = setup().await;

    let groups = session.registry().policy_groups().await;
    assert_eq!(groups.len(), 2);

    for _ in 0..2 {
        let groups = session.refresh_dynamic().await.unwrap();
        let names: Vec<&str> = groups.iter().map(|h| h.key.as_str()).collect();
        assert_eq!(names, ["Proxy", "Direct"]);
    }

    let again = session.registry().discover().await;
    let group_count = again
        .iter()
        .filter(|h| h.kind == ResourceKind::PolicyGroup)
        .count();
    assert_eq!(group_count, 2);

    // Known groups are not started again.
    let detail_reads = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/v1/policy_groups/Proxy")
        .count();
    assert_eq!(detail_reads, 1);
    assert_eq!(session.resources().await.len(), 11);
}

#[tokio::test]
async fn test_new_group_is_appended_and_tracked() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/policy_groups"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"groups": ["Proxy"]})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    mount_surge(&server).await;

    let session = Session::setup(config_for(&server)).await.unwrap();
    assert_eq!(session.registry().policy_groups().await.len(), 1);

    let groups = session.refresh_dynamic().await.unwrap();
    let names: Vec<&str> = groups.iter().map(|h| h.key.as_str()).collect();
    assert_eq!(names, ["Proxy", "Direct"]);

    let direct = session
        .resource(&ResourceId::policy_group("Direct"))
        .await
        .unwrap();
    assert!(direct.read_state().unwrap().available);
    session.shutdown().await;
}

#[tokio::test]
async fn test_feature_in_both_lists_is_tracked_once() {
    let server = MockServer::start().await;
    mount_surge(&server).await;
    let mut config = config_for(&server);
    config.features.push("system_proxy".into());

    let session = Session::setup(config).await.unwrap();
    let handles = session.registry().static_handles();
    let proxies: Vec<_> = handles.iter().filter(|h| h.key == "system_proxy").collect();
    assert_eq!(proxies.len(), 1);
    assert!(proxies[0].mac_only);

    let resources = session.resources().await;
    assert_eq!(resources.len(), 11);
    session.shutdown().await;
}

#[tokio::test]
async fn test_group_enumeration_failure_degrades() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/policy_groups"))
        .respond_with(ResponseTemplate::new(500))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_surge(&server).await;

    let session = Session::setup(config_for(&server)).await.unwrap();
    let resources = session.resources().await;
    assert_eq!(resources.len(), 9);
    assert!(
        resources
            .iter()
            .all(|r| r.kind() != ResourceKind::PolicyGroup)
    );

    let warnings = session.take_warnings().await;
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("Policy groups"));
    assert!(session.take_warnings().await.is_empty());
}

#[tokio::test]
async fn test_missing_mac_feature_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/features/enhanced_mode"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(1)
        .mount(&server)
        .await;
    mount_surge(&server).await;

    let session = Session::setup(config_for(&server)).await.unwrap();
    let id = ResourceId::feature("enhanced_mode");
    let state = session.coordinator().current_state(&id).unwrap();
    assert!(!state.available);
    assert_eq!(state.last_error.as_ref().unwrap().kind, ErrorKind::BadRequest);

    let other = session
        .coordinator()
        .current_state(&ResourceId::feature("system_proxy"))
        .unwrap();
    assert!(other.available);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_switch_profile_reads_back_new_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/profiles/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"profile_name": "Home"})))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/profiles/current"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"profile_name": "Work"})))
        .with_priority(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/profiles/switch"))
        .and(body_json(json!({"name": "Work"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    mount_surge(&server).await;

    let session = Session::setup(config_for(&server)).await.unwrap();
    let before = session
        .coordinator()
        .current_state(&ResourceId::profile())
        .unwrap();
    assert_eq!(before.value.current(), Some("Home"));

    let after = session
        .execute(Command::SwitchProfile {
            name: "Work".into(),
        })
        .await
        .unwrap();
    assert_eq!(after.value.current(), Some("Work"));
    assert_eq!(
        session
            .coordinator()
            .current_state(&ResourceId::profile())
            .unwrap()
            .value
            .current(),
        Some("Work")
    );
}

#[tokio::test]
async fn test_invalid_outbound_mode_sends_nothing() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/outbound"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = session
        .execute(Command::SetOutboundMode { mode: "vpn".into() })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_valid_outbound_mode_posts_once() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/outbound"))
        .and(body_json(json!({"mode": "proxy"})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let outbound = session.resource(&ResourceId::outbound_mode()).await.unwrap();
    let state = outbound.select("proxy").await.unwrap();
    assert!(state.available);
}

#[tokio::test]
async fn test_untracked_target_is_rejected_locally() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path_regex(r"^/v1/policy_groups/.*/select$"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = session
        .execute(Command::SelectPolicy {
            group: "Streaming".into(),
            policy: "US".into(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::UnknownResource { .. }), "got {err:?}");
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[tokio::test]
async fn test_failed_command_leaves_cache_untouched() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/policy_groups/Proxy/select"))
        .respond_with(ResponseTemplate::new(400).set_body_string("unknown policy"))
        .expect(1)
        .mount(&server)
        .await;

    let id = ResourceId::policy_group("Proxy");
    let before = session.coordinator().current_state(&id).unwrap();
    let err = session
        .execute(Command::SelectPolicy {
            group: "Proxy".into(),
            policy: "Mars".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
    assert_eq!(session.coordinator().current_state(&id).unwrap(), before);
}

#[tokio::test]
async fn test_resource_facade_capabilities() {
    let (server, session) = setup().await;
    Mock::given(method("POST"))
        .and(path("/v1/features/mitm"))
        .and(body_json(json!({"enabled": false})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let traffic = session.resource(&ResourceId::traffic()).await.unwrap();
    assert!(!traffic.is_writable());
    let err = traffic.select("anything").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mitm = session.resource(&ResourceId::feature("mitm")).await.unwrap();
    assert!(mitm.set_enabled(false).await.is_ok());
    let err = mitm.select("on").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}
