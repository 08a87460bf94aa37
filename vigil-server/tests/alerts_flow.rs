mod common;

use std::time::{Duration, Instant};

use chrono::Utc;
use serde_json::{Value, json};

use common::build_test_app;
use vigil_model::{ScanFailure, ScanFailureKind, ScanOutcome};

#[tokio::test]
async fn stale_listing_triggers_a_background_scan() {
    let (server, ctx) = build_test_app();
    ctx.alerts.push(json!({ "title": "VAT threshold" }), Utc::now());

    let response = server.get("/api/v1/alerts").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["triggered"], json!(true));
    assert_eq!(body["trigger_mode"], json!("background"));
    assert_eq!(body["metadata"]["count"], json!(1));
    assert_eq!(body["metadata"]["last_refresh"], json!(0));
    assert!(body.get("scan_result").is_none());

    // Optimistic timestamp write lands before the dispatch outcome is known.
    assert!(ctx.refresh.stored().unwrap_or(0) > 0);

    // The detached dispatch completes without the request waiting for it.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(ctx.dispatcher.call_count(), 1);
}

#[tokio::test]
async fn fresh_listing_does_not_trigger() {
    let (server, ctx) = build_test_app();
    ctx.refresh.set(Utc::now().timestamp());

    let response = server.get("/api/v1/alerts").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["triggered"], json!(false));
    assert_eq!(body["trigger_mode"], Value::Null);
    assert_eq!(ctx.dispatcher.call_count(), 0);
}

#[tokio::test]
async fn sync_mode_reports_the_scan_result() {
    let (server, _ctx) = build_test_app();

    let response = server.get("/api/v1/alerts?sync=true").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["triggered"], json!(true));
    assert_eq!(body["trigger_mode"], json!("sync"));
    assert_eq!(body["scan_result"]["created_count"], json!(1));
}

#[tokio::test]
async fn sync_failures_are_metadata_not_errors() {
    let (server, ctx) = build_test_app();
    ctx.dispatcher.set_outcome(ScanOutcome::Failed(ScanFailure {
        kind: ScanFailureKind::HttpError,
        message: "HTTP 502: bad gateway".to_string(),
    }));

    let response = server.get("/api/v1/alerts?sync=true").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["triggered"], json!(true));
    assert_eq!(body["scan_result"]["error"], json!("http_error"));
}

#[tokio::test]
async fn ttl_override_zero_always_triggers() {
    let (server, ctx) = build_test_app();
    ctx.refresh.set(Utc::now().timestamp());

    let response = server.get("/api/v1/alerts?sync=true&ttl_override=0").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["triggered"], json!(true));
    assert_eq!(body["metadata"]["ttl"], json!(0));
}

#[tokio::test]
async fn negative_ttl_override_is_rejected() {
    let (server, _ctx) = build_test_app();

    let response = server.get("/api/v1/alerts?ttl_override=-5").await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn failed_timestamp_write_suppresses_the_trigger() {
    let (server, ctx) = build_test_app();
    *ctx.refresh.fail_writes.lock().unwrap() = true;

    let response = server.get("/api/v1/alerts").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["triggered"], json!(false));
    assert_eq!(ctx.dispatcher.call_count(), 0);
}

#[tokio::test]
async fn background_mode_returns_promptly_despite_slow_scans() {
    let (server, ctx) = build_test_app();
    ctx.dispatcher.set_delay(Duration::from_millis(300));

    let started = Instant::now();
    let response = server.get("/api/v1/alerts").await;
    response.assert_status_ok();
    assert!(started.elapsed() < Duration::from_millis(200));

    let body: Value = response.json();
    assert_eq!(body["trigger_mode"], json!("background"));
}

#[tokio::test]
async fn listing_is_idempotent_inside_the_ttl_window() {
    let (server, ctx) = build_test_app();
    ctx.refresh.set(Utc::now().timestamp());
    ctx.alerts.push(json!({ "title": "first" }), Utc::now());
    ctx.alerts.push(json!({ "title": "second" }), Utc::now());

    let first: Value = server.get("/api/v1/alerts").await.json();
    let second: Value = server.get("/api/v1/alerts").await.json();

    assert_eq!(first["alerts"], second["alerts"]);
    assert_eq!(first["metadata"]["count"], json!(2));
    assert_eq!(ctx.dispatcher.call_count(), 0);
}

#[tokio::test]
async fn newest_alerts_come_first() {
    let (server, ctx) = build_test_app();
    ctx.refresh.set(Utc::now().timestamp());
    ctx.alerts.push(
        json!({ "title": "older" }),
        Utc::now() - chrono::Duration::hours(2),
    );
    ctx.alerts.push(json!({ "title": "newer" }), Utc::now());

    let body: Value = server.get("/api/v1/alerts").await.json();
    assert_eq!(body["alerts"][0]["title"], json!("newer"));
    assert_eq!(body["alerts"][1]["title"], json!("older"));
}

#[tokio::test]
async fn module_health_degrades_without_an_engine() {
    let (server, _ctx) = build_test_app();

    // The test app wires a gate but no concrete engine client.
    let response = server.get("/api/v1/alerts/health").await;
    response.assert_status(axum::http::StatusCode::PARTIAL_CONTENT);

    let body: Value = response.json();
    assert_eq!(body["status"], json!("degraded"));
    assert_eq!(body["configuration"]["alert_engine"], json!(false));
}

#[tokio::test]
async fn manual_scan_requires_an_engine() {
    let (server, _ctx) = build_test_app();

    let response = server.post("/api/v1/alerts/scan").await;
    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}
