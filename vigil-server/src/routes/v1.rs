use axum::{
    Router,
    routing::{get, patch, post, put},
};

use crate::{
    AppState,
    handlers::{alerts, auth, declarations, procedures, settings, tasks, watch},
};

/// Create all v1 API routes
pub fn create_v1_router(_state: AppState) -> Router<AppState> {
    Router::new()
        // Alerts: the gated listing plus module probes
        .route("/alerts", get(alerts::list_alerts))
        .route("/alerts/health", get(alerts::alerts_health))
        .route("/alerts/config", get(alerts::alerts_config))
        .route("/alerts/scan", post(alerts::trigger_scan))
        // Compliance tasks
        .route("/tasks", get(tasks::list_tasks))
        .route("/tasks/org/{org_id}", get(tasks::list_tasks_by_org))
        .route("/tasks/stats/{org_id}", get(tasks::task_stats))
        .route("/tasks/{id}", get(tasks::get_task))
        .route("/tasks/{id}/status", patch(tasks::update_task_status))
        .route("/tasks/{id}/scan", post(tasks::scan_task))
        // Regulatory watch
        .route("/watch/company/{company_id}", get(watch::list_company_alerts))
        .route(
            "/watch/company/{company_id}/analyze",
            post(watch::analyze_company),
        )
        .route("/watch/{alert_id}/read", put(watch::mark_alert_read))
        // Procedures board
        .route("/procedures", get(procedures::list_procedures))
        // Company settings
        .route("/settings/{company_id}", get(settings::get_settings))
        .route("/settings/{company_id}", put(settings::put_settings))
        // Accounts
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::current_user))
        // Declarations workflow
        .route("/declarations", post(declarations::create_declaration))
        .route("/declarations/{id}", get(declarations::get_declaration))
        .route(
            "/declarations/{id}/steps/data",
            post(declarations::record_data_step),
        )
        .route(
            "/declarations/{id}/document",
            get(declarations::declaration_document),
        )
}
