//! Service Router
//!
//! Maps HTTP routes onto InProcess calls into the cashbook service.

use std::sync::Arc;
use std::time::Duration;

use auth::JwtConfig;
use axum::routing::{get, post};
use axum::Router;
use cashbook_service::CashbookService;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub service: CashbookService,
    pub jwt: Arc<JwtConfig>,
}

impl AppState {
    pub fn new(service: CashbookService, jwt: JwtConfig) -> Self {
        Self {
            service,
            jwt: Arc::new(jwt),
        }
    }
}

/// Build the HTTP router.
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/employees",
            get(handlers::list_employees).post(handlers::create_employee),
        )
        .route("/employees/seed", post(handlers::seed_employees))
        .route("/transactions", post(handlers::create_transaction))
        .route("/reports/outstanding", get(handlers::outstanding_report))
        .route("/reports/outstanding/:employee_id", get(handlers::employee_summary))
        .route("/reports/ledger/:employee_id", get(handlers::ledger_report))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
