mod common;

use axum_test::TestServer;
use serde_json::{Value, json};

use common::build_test_app;

async fn register(server: &TestServer, email: &str) -> String {
    let body: Value = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "email": email,
            "password": "long-enough-password",
            "company_name": "Acme Holdings",
        }))
        .await
        .json();
    body["data"]["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn vat_declaration_flows_to_review() {
    let (server, _ctx) = build_test_app();
    let token = register(&server, "cfo@acme.test").await;
    let bearer = format!("Bearer {token}");

    let response = server
        .post("/api/v1/declarations")
        .add_header("Authorization", bearer.clone())
        .json(&json!({ "kind": "vat" }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);

    let created: Value = response.json();
    assert_eq!(created["data"]["status"], json!("in_progress"));
    assert_eq!(created["data"]["current_step"], json!(1));
    assert_eq!(created["data"]["total_steps"], json!(1));
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/api/v1/declarations/{id}/steps/data"))
        .add_header("Authorization", bearer.clone())
        .json(&json!({
            "period": "2025-10",
            "tax_regime": "standard",
            "figures": {
                "vat_collected": 12450.0,
                "vat_deductible": 8000.0,
            }
        }))
        .await;
    response.assert_status_ok();

    let updated: Value = response.json();
    assert_eq!(updated["data"]["status"], json!("under_review"));
    assert_eq!(
        updated["data"]["data"]["figures"]["vat_due"],
        json!(4450.0)
    );
    assert_eq!(updated["data"]["data"]["period"], json!("2025-10"));
}

#[tokio::test]
async fn unknown_kinds_and_bad_periods_are_rejected() {
    let (server, _ctx) = build_test_app();
    let token = register(&server, "cfo@acme.test").await;
    let bearer = format!("Bearer {token}");

    let response = server
        .post("/api/v1/declarations")
        .add_header("Authorization", bearer.clone())
        .json(&json!({ "kind": "lunar_tax" }))
        .await;
    response.assert_status_bad_request();

    let created: Value = server
        .post("/api/v1/declarations")
        .add_header("Authorization", bearer.clone())
        .json(&json!({ "kind": "vat" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = server
        .post(&format!("/api/v1/declarations/{id}/steps/data"))
        .add_header("Authorization", bearer)
        .json(&json!({ "period": "October" }))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn declarations_are_invisible_to_other_accounts() {
    let (server, _ctx) = build_test_app();
    let owner = register(&server, "owner@acme.test").await;
    let intruder = register(&server, "intruder@globex.test").await;

    let created: Value = server
        .post("/api/v1/declarations")
        .add_header("Authorization", format!("Bearer {owner}"))
        .json(&json!({ "kind": "vat" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    let response = server
        .get(&format!("/api/v1/declarations/{id}"))
        .add_header("Authorization", format!("Bearer {intruder}"))
        .await;
    response.assert_status_not_found();
}

#[tokio::test]
async fn document_renders_the_filled_summary() {
    let (server, _ctx) = build_test_app();
    let token = register(&server, "cfo@acme.test").await;
    let bearer = format!("Bearer {token}");

    let created: Value = server
        .post("/api/v1/declarations")
        .add_header("Authorization", bearer.clone())
        .json(&json!({ "kind": "vat" }))
        .await
        .json();
    let id = created["data"]["id"].as_str().unwrap().to_string();

    server
        .post(&format!("/api/v1/declarations/{id}/steps/data"))
        .add_header("Authorization", bearer.clone())
        .json(&json!({
            "period": "2025-10",
            "figures": { "vat_collected": 100.0 }
        }))
        .await
        .assert_status_ok();

    let response = server
        .get(&format!("/api/v1/declarations/{id}/document"))
        .add_header("Authorization", bearer)
        .await;
    response.assert_status_ok();

    let html = response.text();
    assert!(html.contains("VAT return 2025-10"));
    assert!(html.contains("Acme Holdings"));
    assert!(html.contains("vat collected"));
}

#[tokio::test]
async fn procedures_board_reflects_declarations() {
    let (server, _ctx) = build_test_app();
    let token = register(&server, "cfo@acme.test").await;
    let bearer = format!("Bearer {token}");

    let created: Value = server
        .post("/api/v1/declarations")
        .add_header("Authorization", bearer.clone())
        .json(&json!({ "kind": "social_security" }))
        .await
        .json();
    let user_id = created["data"]["user_id"].as_str().unwrap().to_string();

    let body: Value = server
        .get(&format!("/api/v1/procedures?user_id={user_id}"))
        .await
        .json();

    assert_eq!(body["data"]["count"], json!(1));
    let procedure = &body["data"]["procedures"][0];
    assert_eq!(procedure["status"], json!("inprogress"));
    assert_eq!(procedure["type"], json!("Social"));
    assert_eq!(procedure["total_steps"], json!(3));
}
