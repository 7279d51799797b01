//! HTTP-level tests: JSON → router → service → memory store → JSON.

use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};

use garment_requests::app_state::AppState;
use garment_requests::build_router;
use garment_requests::db::store::MemoryStore;

fn make_server() -> TestServer {
    let state = AppState::new(Arc::new(MemoryStore::new()));
    TestServer::new(build_router(state))
}

fn cotton() -> Value {
    json!({
        "materialId": "M1",
        "materialName": "Cotton",
        "type": "Fabric",
        "date": "2024-01-01",
        "quantity": "50",
        "approvalStatus": "Pending"
    })
}

fn size_chart() -> Value {
    json!({
        "country": "Sri Lanka",
        "size": "M",
        "measurements": { "chest": 40, "waist": 32, "hip": 38, "sleeveLength": 24 },
        "date": "2024-02-10"
    })
}

#[tokio::test]
async fn material_request_round_trip() {
    let server = make_server();

    let response = server.post("/api/materialRequests").json(&cotton()).await;
    response.assert_status(StatusCode::CREATED);
    let created: Value = response.json();
    let id = created["_id"].as_str().expect("id assigned").to_string();
    uuid::Uuid::parse_str(&id).unwrap();

    let response = server.get("/api/materialRequests").await;
    response.assert_status_ok();
    let listed: Vec<Value> = response.json();
    assert_eq!(listed.len(), 1);
    for (key, value) in cotton().as_object().unwrap() {
        assert_eq!(&listed[0][key], value, "field {key}");
    }

    let response = server
        .put(&format!("/api/materialRequests/{id}"))
        .json(&json!({ "approvalStatus": "Approved" }))
        .await;
    response.assert_status_ok();
    let updated: Value = response.json();
    assert_eq!(updated["_id"], id.as_str());
    assert_eq!(updated["approvalStatus"], "Approved");
    assert_eq!(updated["materialName"], "Cotton");

    let response = server.get(&format!("/api/materialRequests/{id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["approvalStatus"], "Approved");

    let response = server.delete(&format!("/api/materialRequests/{id}")).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["message"], "Material request deleted");

    let listed: Vec<Value> = server.get("/api/materialRequests").await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn second_delete_is_not_found() {
    let server = make_server();
    let created: Value = server.post("/api/sizeChartRequests").json(&size_chart()).await.json();
    let path = format!("/api/sizeChartRequests/{}", created["_id"].as_str().unwrap());

    server.delete(&path).await.assert_status_ok();
    let response = server.delete(&path).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Size chart request not found");
}

#[tokio::test]
async fn empty_body_is_rejected_on_every_resource() {
    let server = make_server();
    for route in ["designRequests", "materialRequests", "sizeChartRequests"] {
        let response = server.post(&format!("/api/{route}")).json(&json!({})).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert!(!body["errors"]["fields"].as_array().unwrap().is_empty());

        let listed: Vec<Value> = server.get(&format!("/api/{route}")).await.json();
        assert!(listed.is_empty(), "{route} persisted an invalid record");
    }
}

#[tokio::test]
async fn unreadable_json_is_a_validation_error() {
    let server = make_server();
    let response = server
        .post("/api/designRequests")
        .bytes(bytes::Bytes::from_static(b"{not json"))
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_and_malformed_ids_are_not_found() {
    let server = make_server();
    let patch = json!({ "approvalStatus": "Rejected" });

    let missing = format!("/api/designRequests/{}", uuid::Uuid::new_v4());
    server.put(&missing).json(&patch).await.assert_status(StatusCode::NOT_FOUND);
    server.get(&missing).await.assert_status(StatusCode::NOT_FOUND);
    server
        .put("/api/designRequests/not-a-uuid")
        .json(&patch)
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_update_is_rejected() {
    let server = make_server();
    let created: Value = server.post("/api/materialRequests").json(&cotton()).await.json();
    let response = server
        .put(&format!("/api/materialRequests/{}", created["_id"].as_str().unwrap()))
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["errors"]["fields"][0]["message"],
        "No fields provided for update"
    );
}

#[tokio::test]
async fn future_date_is_rejected_by_the_server() {
    let server = make_server();
    let mut body = cotton();
    body["date"] = json!("2999-01-01");
    server
        .post("/api/materialRequests")
        .json(&body)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn pdf_report_is_an_attachment() {
    let server = make_server();
    server.post("/api/sizeChartRequests").json(&size_chart()).await;

    let response = server.get("/api/sizeChartRequests/pdf").await;
    response.assert_status_ok();
    assert_eq!(response.header("content-type"), "application/pdf");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=SizeChartRequests.pdf"
    );
    assert!(response.as_bytes().starts_with(b"%PDF"));
}

#[tokio::test]
async fn empty_collection_still_renders_a_report() {
    let server = make_server();
    let response = server.get("/api/designRequests/pdf").await;
    response.assert_status_ok();
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=DesignRequests.pdf"
    );
}

#[tokio::test]
async fn health_endpoints_report_ready_store() {
    let server = make_server();

    let response = server.get("/health/live").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"]["status"], "live");

    let response = server.get("/health/ready").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["success"], true);
}

#[tokio::test]
async fn openapi_document_lists_every_resource() {
    let server = make_server();
    let response = server.get("/api-docs/openapi.json").await;
    response.assert_status_ok();

    let doc: Value = response.json();
    let paths = doc["paths"].as_object().unwrap();
    for path in [
        "/api/designRequests",
        "/api/materialRequests/{id}",
        "/api/sizeChartRequests/pdf",
    ] {
        assert!(paths.contains_key(path), "missing {path}");
    }
    assert!(doc["components"]["schemas"]["SizeChartRequest"].is_object());
}
