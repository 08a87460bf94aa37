mod common;

use chrono::Utc;
use serde_json::{Value, json};

use common::build_test_app;
use vigil_model::{
    InfoAlertId, InfoAlertRecord, WatchPriority, WatchStatus,
};

fn finding(company_id: &str, title: &str) -> InfoAlertRecord {
    InfoAlertRecord {
        id: InfoAlertId::new(),
        company_id: company_id.to_string(),
        user_id: None,
        title: title.to_string(),
        message: "A directive changed".to_string(),
        source: "https://example.org/directive".to_string(),
        priority: WatchPriority::High,
        status: WatchStatus::Unread,
        detected_at: Utc::now(),
        read_at: None,
        metadata: json!({}),
    }
}

#[tokio::test]
async fn company_listing_is_scoped() {
    let (server, ctx) = build_test_app();
    ctx.info_alerts.push(finding("acme", "VAT change"));
    ctx.info_alerts.push(finding("acme", "Filing deadline"));
    ctx.info_alerts.push(finding("globex", "Other company"));

    let body: Value = server.get("/api/v1/watch/company/acme").await.json();
    assert_eq!(body["data"]["total"], json!(2));
    for alert in body["data"]["alerts"].as_array().unwrap() {
        assert_eq!(alert["company_id"], json!("acme"));
    }
}

#[tokio::test]
async fn marking_read_flips_status() {
    let (server, ctx) = build_test_app();
    let record = finding("acme", "VAT change");
    let id = record.id;
    ctx.info_alerts.push(record);

    let response = server.put(&format!("/api/v1/watch/{id}/read")).await;
    response.assert_status_ok();

    let body: Value = server.get("/api/v1/watch/company/acme").await.json();
    assert_eq!(body["data"]["alerts"][0]["status"], json!("read"));
    assert!(body["data"]["alerts"][0]["read_at"].is_string());
}

#[tokio::test]
async fn marking_an_unknown_alert_is_not_found() {
    let (server, _ctx) = build_test_app();

    let response = server
        .put("/api/v1/watch/00000000-0000-7000-8000-000000000000/read")
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn analysis_requires_the_fiscal_agent() {
    let (server, _ctx) = build_test_app();

    let response = server.post("/api/v1/watch/company/acme/analyze").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn settings_round_trip() {
    let (server, _ctx) = build_test_app();

    server
        .get("/api/v1/settings/acme")
        .await
        .assert_status_not_found();

    let response = server
        .put("/api/v1/settings/acme")
        .json(&json!({
            "sector": "logistics",
            "tax_regime": "standard",
            "legal_form": "LLC",
        }))
        .await;
    response.assert_status_ok();

    let body: Value = server.get("/api/v1/settings/acme").await.json();
    assert_eq!(body["data"]["sector"], json!("logistics"));
    assert_eq!(body["data"]["company_id"], json!("acme"));
}
