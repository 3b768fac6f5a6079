//! HTTP wiring shared by the server binary and the integration tests.

use actix_web::{error, get, web, HttpResponse, Responder};
use tracing::warn;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::BasicAuth;
use crate::models::ServiceInfo;
use crate::orchestrator::QueryOrchestrator;
use crate::{account, balance, transaction};

/// Health check endpoint that verifies store connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Store reachable"),
        (status = 503, description = "Store unreachable")
    )
)]
#[get("/health")]
pub async fn health_check(orchestrator: web::Data<QueryOrchestrator>) -> impl Responder {
    match orchestrator.store().ping().await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "status": "healthy",
            "store": "connected"
        })),
        Err(e) => {
            warn!(error = %e, "health check failed");
            HttpResponse::ServiceUnavailable().json(serde_json::json!({
                "status": "unhealthy",
                "store": "disconnected"
            }))
        }
    }
}

/// GET /api - Service name and version
#[utoipa::path(
    get,
    path = "/api",
    tag = "Health",
    responses(
        (status = 200, description = "Service info", body = ServiceInfo),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[get("")]
pub async fn service_info(_auth: BasicAuth) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ServiceInfo::current()))
}

/// Registers every route. Malformed query strings, paths and bodies are
/// reported as validation errors in the standard error body.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(err.to_string()))
    }))
    .app_data(web::JsonConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(err.to_string()))
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _req| {
        error::Error::from(AppError::ValidationError(err.to_string()))
    }))
    .service(health_check)
    .service(
        web::scope("/api")
            .service(service_info)
            // Accounts
            .service(account::list_accounts)
            .service(account::create_account)
            .service(account::update_account)
            .service(account::delete_account)
            // Transactions
            .service(transaction::list_transactions)
            .service(transaction::create_transaction)
            .service(transaction::get_transaction)
            .service(transaction::update_transaction)
            .service(transaction::delete_transaction)
            // Balances
            .service(balance::balances_by_category)
            .service(balance::balances_by_time)
            .service(balance::balances_by_tags),
    );
}
