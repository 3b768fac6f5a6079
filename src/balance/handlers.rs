use actix_web::{get, web, HttpResponse};
use chrono::Utc;
use std::collections::HashMap;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::BasicAuth;
use crate::orchestrator::QueryOrchestrator;

use super::models::{
    balance_over_time_response, BalanceWindowQuery, BudgetResponse, TagBreakdownResponse,
};

/// GET /api/balances/by_category - Budget for a time window
#[utoipa::path(
    get,
    path = "/api/balances/by_category",
    tag = "Balances",
    params(BalanceWindowQuery),
    responses(
        (status = 200, description = "Actual vs expected per waterfall category", body = BudgetResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[get("/balances/by_category")]
pub async fn balances_by_category(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    query: web::Query<BalanceWindowQuery>,
) -> Result<HttpResponse, AppError> {
    let window = query.window(Utc::now().timestamp())?;
    let budget = orchestrator.budget(window).await?;

    Ok(HttpResponse::Ok().json(BudgetResponse::from(budget)))
}

/// GET /api/balances/by_time - Cumulative balance per month end
#[utoipa::path(
    get,
    path = "/api/balances/by_time",
    tag = "Balances",
    responses(
        (status = 200, description = "Month-end epoch seconds to cumulative balance", body = HashMap<String, f64>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[get("/balances/by_time")]
pub async fn balances_by_time(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
) -> Result<HttpResponse, AppError> {
    let series = orchestrator.balance_over_time().await?;

    Ok(HttpResponse::Ok().json(balance_over_time_response(series)))
}

/// GET /api/balances/by_tags - Debit and credit totals per tag for a time window
#[utoipa::path(
    get,
    path = "/api/balances/by_tags",
    tag = "Balances",
    params(BalanceWindowQuery),
    responses(
        (status = 200, description = "Per-tag totals", body = TagBreakdownResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[get("/balances/by_tags")]
pub async fn balances_by_tags(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    query: web::Query<BalanceWindowQuery>,
) -> Result<HttpResponse, AppError> {
    let window = query.window(Utc::now().timestamp())?;
    let breakdown = orchestrator.tag_breakdown(window).await?;

    Ok(HttpResponse::Ok().json(TagBreakdownResponse::from(breakdown)))
}
