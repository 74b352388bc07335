//! Route handlers.
//!
//! Each handler validates its input at the boundary and makes one InProcess
//! call into [`cashbook_service::CashbookService`].

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use cashbook_service::{Employee, LedgerRow, OutstandingSummary, Transaction};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::api_error::ApiError;
use crate::extract::{AdminUser, AuthenticatedUser};
use crate::router::AppState;

type ApiResult<T> = Result<T, ApiError>;

/// Body of `POST /transactions`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransactionRequest {
    pub employee_id: String,
    #[serde(alias = "type")]
    pub kind: String,
    pub amount: Decimal,
    #[serde(alias = "date")]
    pub occurred_on: String,
}

/// Body of `POST /employees`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    pub employee_id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub storage: &'static str,
}

pub async fn health(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state.service.health_check().await?;
    Ok(Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        storage: state.service.backend(),
    }))
}

pub async fn list_employees(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(state.service.list_employees().await?))
}

pub async fn create_employee(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateEmployeeRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Employee>)> {
    let Json(req) = payload?;
    let employee = state.service.add_employee(&req.employee_id, &req.name).await?;
    tracing::info!("{} added employee {}", admin.sub, employee.employee_id);
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn seed_employees(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Employee>>> {
    tracing::info!("{} requested the default roster", admin.sub);
    Ok(Json(state.service.seed_default_employees().await?))
}

pub async fn create_transaction(
    AuthenticatedUser(caller): AuthenticatedUser,
    State(state): State<AppState>,
    payload: Result<Json<CreateTransactionRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let Json(req) = payload?;
    let transaction = state
        .service
        .record_transaction(&req.employee_id, &req.kind, req.amount, &req.occurred_on)
        .await?;

    tracing::debug!("{} recorded transaction {:?}", caller.sub, transaction.id);
    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn outstanding_report(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<OutstandingSummary>>> {
    Ok(Json(state.service.outstanding_report().await?))
}

pub async fn employee_summary(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<OutstandingSummary>> {
    Ok(Json(state.service.employee_summary(&employee_id).await?))
}

pub async fn ledger_report(
    _user: AuthenticatedUser,
    State(state): State<AppState>,
    Path(employee_id): Path<String>,
) -> ApiResult<Json<Vec<LedgerRow>>> {
    Ok(Json(state.service.ledger_report(&employee_id).await?))
}
