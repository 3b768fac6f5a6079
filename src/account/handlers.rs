use actix_web::{delete, get, patch, post, web, HttpResponse};
use rust_decimal::Decimal;
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::BasicAuth;
use crate::models::MessageResponse;
use crate::orchestrator::QueryOrchestrator;

use super::models::{AccountIdPath, AccountResponse, CreateAccountDto, UpdateAccountDto};
use super::service::AccountService;

/// GET /api/accounts - List all accounts with their balances
#[utoipa::path(
    get,
    path = "/api/accounts",
    tag = "Accounts",
    responses(
        (status = 200, description = "Accounts with balances", body = Vec<AccountResponse>),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[get("/accounts")]
pub async fn list_accounts(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
) -> Result<HttpResponse, AppError> {
    let accounts = orchestrator.accounts_with_balances().await?;

    let response: Vec<AccountResponse> = accounts
        .into_iter()
        .map(|(account, balance)| AccountResponse::from_account(account, balance))
        .collect();

    Ok(HttpResponse::Ok().json(response))
}

/// POST /api/accounts - Create a new account
#[utoipa::path(
    post,
    path = "/api/accounts",
    tag = "Accounts",
    request_body = CreateAccountDto,
    responses(
        (status = 201, description = "Account created", body = AccountResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 409, description = "Account id already taken", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[post("/accounts")]
pub async fn create_account(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    body: web::Json<CreateAccountDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let account = AccountService::create_account(orchestrator.store(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(AccountResponse::from_account(account, Decimal::ZERO)))
}

/// PATCH /api/accounts/{account_id} - Rename an account
#[utoipa::path(
    patch,
    path = "/api/accounts/{account_id}",
    tag = "Accounts",
    params(AccountIdPath),
    request_body = UpdateAccountDto,
    responses(
        (status = 200, description = "Account renamed", body = MessageResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[patch("/accounts/{account_id}")]
pub async fn update_account(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    path: web::Path<AccountIdPath>,
    body: web::Json<UpdateAccountDto>,
) -> Result<HttpResponse, AppError> {
    path.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let account =
        AccountService::rename_account(orchestrator.store(), &path.account_id, &body).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Account updated successfully", account.id)))
}

/// DELETE /api/accounts/{account_id} - Delete an unused account
#[utoipa::path(
    delete,
    path = "/api/accounts/{account_id}",
    tag = "Accounts",
    params(AccountIdPath),
    responses(
        (status = 200, description = "Account deleted", body = MessageResponse),
        (status = 400, description = "Malformed account id", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 409, description = "Account is referenced by transactions", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[delete("/accounts/{account_id}")]
pub async fn delete_account(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    path: web::Path<AccountIdPath>,
) -> Result<HttpResponse, AppError> {
    path.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    AccountService::delete_account(orchestrator.store(), &path.account_id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Account deleted successfully",
        &path.account_id,
    )))
}
