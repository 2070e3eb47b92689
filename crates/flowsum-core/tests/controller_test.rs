#![allow(clippy::unwrap_used)]
// End-to-end runs of `Controller` against a wiremock controller.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use secrecy::SecretString;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use flowsum_core::{
    Aggregation, Controller, ControllerConfig, CoreError, Credentials, Period, SummaryRequest,
    TimeWindow, run,
};

// ── Helpers ─────────────────────────────────────────────────────────

const TENANT: &str = "1499999999999999";
const TOKEN: &str = "good-token";

fn tenant_path(version: &str, suffix: &str) -> String {
    format!("/{version}/api/tenants/{TENANT}/{suffix}")
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2.1/api/profile"))
        .and(header("X-Auth-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tenant_id": TENANT,
            "email": "ops@example.com"
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(tenant_path("v4.7", "sites")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "items": [
                { "id": "1500", "name": "Chicago-1", "description": "HQ" },
                { "id": "1501", "name": "Chicago-2", "description": null }
            ]
        })))
        .mount(server)
        .await;
}

async fn mount_logout(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2.0/api/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> Controller {
    let config = ControllerConfig::new(Url::parse(&server.uri()).unwrap())
        .with_timeout(Duration::from_secs(5));
    let mut controller = Controller::new(config).unwrap();
    controller
        .authenticate(&Credentials::Token(SecretString::from(TOKEN.to_string())))
        .await
        .unwrap();
    controller
}

fn request() -> SummaryRequest {
    let period = Period::parse("1").unwrap();
    let now = Utc.with_ymd_and_hms(2024, 6, 11, 12, 0, 0).unwrap();
    SummaryRequest::new("chicago", period, TimeWindow::anchored(now, 1, &period).unwrap())
}

// ── Tests ───────────────────────────────────────────────────────────

#[tokio::test]
async fn test_full_run_aggregates_and_logs_out() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_logout(&server).await;

    Mock::given(method("POST"))
        .and(path(tenant_path("v3.6", "monitor/flows")))
        .and(header("X-Auth-Token", TOKEN))
        .and(body_partial_json(json!({
            "start_time": "2024-06-10T12:00:00.000Z",
            "end_time": "2024-06-10T13:00:00.000Z",
            "filter": { "site": ["1500"] }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "flows": { "items": [
                { "priority_class": 1, "bytes_c2s": 2_000_000 },
                { "priority_class": 1, "bytes_c2s": 2_000_000 }
            ]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut controller = connect(&server).await;
    let report = run(&mut controller, &request()).await.unwrap();

    assert_eq!(report.site.entity.display_name, "Chicago-1");
    assert_eq!(report.site.score, 88);
    match report.aggregation {
        Aggregation::Flows(stats) => {
            assert_eq!(stats.flow_count, 2);
            assert_eq!(stats.priorities.get(1), Some(2));
        }
        Aggregation::Empty => panic!("expected flows"),
    }
    assert!(!controller.is_authenticated());
}

#[tokio::test]
async fn test_app_filter_resolves_against_appdefs() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_logout(&server).await;

    Mock::given(method("GET"))
        .and(path(tenant_path("v2.3", "appdefs")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                { "id": "77", "display_name": "ssh" },
                { "id": "78", "display_name": "office365" }
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(tenant_path("v3.6", "monitor/flows")))
        .and(body_partial_json(json!({
            "filter": { "site": ["1500"], "app": ["77"], "flow": { "source_ip": ["10.0.0.0/8"] } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "flows": { "items": [] } })))
        .expect(1)
        .mount(&server)
        .await;

    let req = request()
        .with_app("ssh")
        .with_source_prefix("10.0.0.0/8".parse().unwrap());
    let mut controller = connect(&server).await;
    let report = run(&mut controller, &req).await.unwrap();

    assert_eq!(report.app.unwrap().entity.id, "77");
    assert_eq!(report.aggregation, Aggregation::Empty);
}

#[tokio::test]
async fn test_flow_query_failure_still_logs_out() {
    let server = MockServer::start().await;
    mount_session(&server).await;
    mount_logout(&server).await;

    Mock::given(method("POST"))
        .and(path(tenant_path("v3.6", "monitor/flows")))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "_error": [{ "code": "INTERNAL", "message": "flow service down" }]
        })))
        .mount(&server)
        .await;

    let mut controller = connect(&server).await;
    let err = run(&mut controller, &request()).await.unwrap_err();

    assert!(
        matches!(err, CoreError::QueryFailed { .. }),
        "expected QueryFailed, got: {err:?}"
    );
}

#[tokio::test]
async fn test_site_listing_failure_is_directory_unavailable() {
    let server = MockServer::start().await;
    mount_logout(&server).await;

    Mock::given(method("GET"))
        .and(path("/v2.1/api/profile"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "tenant_id": TENANT })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(tenant_path("v4.7", "sites")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut controller = connect(&server).await;
    let err = run(&mut controller, &request()).await.unwrap_err();

    assert!(
        matches!(err, CoreError::DirectoryUnavailable { ref resource, .. } if resource == "site"),
        "expected DirectoryUnavailable, got: {err:?}"
    );
}

#[tokio::test]
async fn test_rejected_token_is_authentication_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v2.1/api/profile"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let config = ControllerConfig::new(Url::parse(&server.uri()).unwrap());
    let mut controller = Controller::new(config).unwrap();
    let result = controller
        .authenticate(&Credentials::Token(SecretString::from("bad".to_string())))
        .await;

    assert!(matches!(result, Err(CoreError::AuthenticationFailed { .. })));
    assert!(!controller.is_authenticated());
}
