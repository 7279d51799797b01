//! The form controller driving a live server through the HTTP client.

use std::sync::Arc;

use serde_json::json;
use tokio::net::TcpListener;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use garment_requests::app_state::AppState;
use garment_requests::build_router;
use garment_requests::client::{self, ClientError, FormController, HttpResourceClient, NoticeLevel, ResourceApi};
use garment_requests::config::Config;
use garment_requests::db::models::requests::ApprovalStatus;
use garment_requests::db::schema::{DESIGN_REQUESTS, MATERIAL_REQUESTS};
use garment_requests::db::store::MemoryStore;
use garment_requests::report::FileSink;

/// Serves a fresh app on an ephemeral port and returns its API root.
async fn spawn_app() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(AppState::new(Arc::new(MemoryStore::new())));
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

#[tokio::test]
async fn http_client_maps_error_taxonomy() {
    let base = spawn_app().await;
    let client = HttpResourceClient::new(reqwest::Client::new(), &base, &DESIGN_REQUESTS);

    let err = assert_err!(client.create(&json!({ "patternId": "P1" })).await);
    match err {
        ClientError::Validation(message) => assert!(message.contains("patternName"), "{message}"),
        other => panic!("expected validation error, got {other:?}"),
    }

    let err = assert_err!(client.delete(Uuid::new_v4()).await);
    assert!(matches!(err, ClientError::NotFound(_)));

    let records = assert_ok!(client.list().await);
    assert!(records.is_empty());
}

#[tokio::test]
async fn controller_round_trip_over_http() {
    let base = spawn_app().await;
    let api = HttpResourceClient::new(reqwest::Client::new(), &base, &MATERIAL_REQUESTS);
    let mut form = FormController::new(&MATERIAL_REQUESTS, api);

    for (field, value) in [
        ("materialId", "M1"),
        ("materialName", "Cotton"),
        ("type", "Fabric"),
        ("date", "2024-01-01"),
        ("quantity", "50"),
    ] {
        assert!(form.set_field(field, value), "{field} refused");
    }
    assert!(form.submit().await);
    assert_eq!(form.records().len(), 1);

    let id = form.records()[0].id;
    assert!(form.edit(id));
    form.set_status(ApprovalStatus::Rejected);
    assert!(form.submit().await);
    assert_eq!(form.records()[0].fields["approvalStatus"], "Rejected");

    let dir = tempfile::tempdir().unwrap();
    let path = form.export(FileSink::new(dir.path())).expect("report exported");
    assert!(std::fs::read(path).unwrap().starts_with(b"%PDF"));

    assert!(form.delete(id).await);
    assert!(form.records().is_empty());
    assert!(form.take_notices().iter().all(|n| n.level == NoticeLevel::Info));
}

#[tokio::test]
async fn unreachable_server_becomes_a_notice() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let api = HttpResourceClient::new(reqwest::Client::new(), &format!("http://{addr}/api"), &DESIGN_REQUESTS);
    let mut form = FormController::new(&DESIGN_REQUESTS, api);

    assert!(!form.refresh().await);
    let notices = form.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].level, NoticeLevel::Error);
}

#[tokio::test]
async fn configured_form_exports_into_report_dir() {
    let base = spawn_app().await;
    let dir = tempfile::tempdir().unwrap();
    let report_dir = dir.path().to_string_lossy().into_owned();
    let config = Config::from_lookup(|name| match name {
        "API_BASE_URL" => Some(base.clone()),
        "REPORT_DIR" => Some(report_dir.clone()),
        _ => None,
    })
    .unwrap();

    let mut form = client::form_for(&config, reqwest::Client::new(), &DESIGN_REQUESTS);
    for (field, value) in [
        ("patternId", "P7"),
        ("patternName", "Wrap Dress"),
        ("material", "Silk"),
        ("size", "M"),
        ("country", "Sri Lanka"),
        ("date", "2024-03-05"),
    ] {
        assert!(form.set_field(field, value), "{field} refused");
    }
    assert!(form.submit().await);

    form.set_filter("wrap");
    assert_eq!(form.visible().len(), 1);
    let path = form.export(client::report_sink(&config)).expect("report exported");
    assert_eq!(path, dir.path().join("DesignRequests.pdf"));
}
