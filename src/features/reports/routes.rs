use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::features::reports::handlers::{self, ReportState};
use crate::features::reports::services::ReportService;

/// Body ceiling for report forms; photos above the per-photo ceiling still
/// fit so they are answered with the size error instead of a dropped stream
const MAX_FORM_BODY: usize = 10 * 1024 * 1024;

/// Create the public routes for the reports feature
pub fn public_routes(report_service: Arc<ReportService>) -> Router {
    let state = ReportState { report_service };

    Router::new()
        .route("/api/report/{reportId}", get(handlers::read))
        .route("/api/report/photo/{reportId}", get(handlers::photo))
        .route("/api/reports", get(handlers::list))
        .route("/api/reports/search", get(handlers::list_search))
        .route("/api/reports/categories", get(handlers::list_categories))
        .route("/api/reports/related/{reportId}", get(handlers::list_related))
        .route("/api/reports/by/search", post(handlers::list_by_search))
        .with_state(state)
}

/// Create the mutating routes for the reports feature
///
/// The caller applies the auth middleware; the handlers' guards enforce
/// ownership and the admin role.
pub fn protected_routes(report_service: Arc<ReportService>) -> Router {
    let state = ReportState { report_service };

    Router::new()
        .route("/api/report/create/{userId}", post(handlers::create))
        .route(
            "/api/report/{reportId}/{userId}",
            put(handlers::update).delete(handlers::remove),
        )
        .layer(DefaultBodyLimit::max(MAX_FORM_BODY))
        .with_state(state)
}
