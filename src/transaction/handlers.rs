use actix_web::{delete, get, patch, post, web, HttpResponse};
use validator::Validate;

use crate::errors::{AppError, ErrorResponse};
use crate::extractors::BasicAuth;
use crate::models::MessageResponse;
use crate::orchestrator::QueryOrchestrator;

use super::models::{
    CreateTransactionDto, CreatedTransactionResponse, ListTransactionsQuery, TransactionIdPath,
    TransactionListItem, TransactionResponse, UpdateTransactionDto,
};
use super::service::TransactionService;

/// Response header carrying the number of transactions matching the filter.
pub const TOTAL_COUNT_HEADER: &str = "x-total-count";

/// GET /api/transactions - Filtered, paginated listing with closing balances
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "Transactions",
    params(ListTransactionsQuery),
    responses(
        (status = 200, description = "Page of transactions; total matches in the x-total-count header",
            body = Vec<TransactionListItem>,
            headers(("x-total-count" = u64, description = "Transactions matching the filter"))),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[get("/transactions")]
pub async fn list_transactions(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    query: web::Query<ListTransactionsQuery>,
) -> Result<HttpResponse, AppError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;
    let query = query.to_query()?;

    let (items, total) = orchestrator.list_with_closing_balances(&query).await?;

    let response: Vec<TransactionListItem> = items
        .into_iter()
        .map(|(transaction, closing_bal)| TransactionListItem {
            transaction: transaction.into(),
            closing_bal,
        })
        .collect();

    Ok(HttpResponse::Ok()
        .insert_header((TOTAL_COUNT_HEADER, total.to_string()))
        .json(response))
}

/// GET /api/transactions/{transaction_id} - Get a specific transaction
#[utoipa::path(
    get,
    path = "/api/transactions/{transaction_id}",
    tag = "Transactions",
    params(TransactionIdPath),
    responses(
        (status = 200, description = "Transaction details", body = TransactionResponse),
        (status = 400, description = "Malformed transaction id", body = ErrorResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[get("/transactions/{transaction_id}")]
pub async fn get_transaction(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    path: web::Path<TransactionIdPath>,
) -> Result<HttpResponse, AppError> {
    let transaction =
        TransactionService::get_transaction(orchestrator.store(), path.parse()?).await?;

    Ok(HttpResponse::Ok().json(TransactionResponse::from(transaction)))
}

/// POST /api/transactions - Record a new transaction
#[utoipa::path(
    post,
    path = "/api/transactions",
    tag = "Transactions",
    request_body = CreateTransactionDto,
    responses(
        (status = 201, description = "Transaction created", body = CreatedTransactionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Account not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[post("/transactions")]
pub async fn create_transaction(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    body: web::Json<CreateTransactionDto>,
) -> Result<HttpResponse, AppError> {
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let transaction =
        TransactionService::create_transaction(orchestrator.store(), body.into_inner()).await?;

    Ok(HttpResponse::Created().json(CreatedTransactionResponse { id: transaction.id }))
}

/// PATCH /api/transactions/{transaction_id} - Update a transaction
#[utoipa::path(
    patch,
    path = "/api/transactions/{transaction_id}",
    tag = "Transactions",
    params(TransactionIdPath),
    request_body = UpdateTransactionDto,
    responses(
        (status = 200, description = "Transaction updated", body = TransactionResponse),
        (status = 400, description = "Validation error", body = ErrorResponse),
        (status = 404, description = "Transaction or account not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[patch("/transactions/{transaction_id}")]
pub async fn update_transaction(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    path: web::Path<TransactionIdPath>,
    body: web::Json<UpdateTransactionDto>,
) -> Result<HttpResponse, AppError> {
    let id = path.parse()?;
    body.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let transaction =
        TransactionService::update_transaction(orchestrator.store(), id, body.into_inner())
            .await?;

    Ok(HttpResponse::Ok().json(TransactionResponse::from(transaction)))
}

/// DELETE /api/transactions/{transaction_id} - Delete a transaction
#[utoipa::path(
    delete,
    path = "/api/transactions/{transaction_id}",
    tag = "Transactions",
    params(TransactionIdPath),
    responses(
        (status = 200, description = "Transaction deleted", body = MessageResponse),
        (status = 404, description = "Transaction not found", body = ErrorResponse),
        (status = 401, description = "Unauthorized", body = ErrorResponse)
    ),
    security(("basic_auth" = []))
)]
#[delete("/transactions/{transaction_id}")]
pub async fn delete_transaction(
    orchestrator: web::Data<QueryOrchestrator>,
    _auth: BasicAuth,
    path: web::Path<TransactionIdPath>,
) -> Result<HttpResponse, AppError> {
    let id = path.parse()?;
    TransactionService::delete_transaction(orchestrator.store(), id).await?;

    Ok(HttpResponse::Ok().json(MessageResponse::new("Transaction deleted successfully", id)))
}
