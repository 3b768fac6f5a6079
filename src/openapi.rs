use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::account::models::{AccountResponse, CreateAccountDto, UpdateAccountDto};
use crate::balance::models::{BudgetResponse, TagBreakdownResponse};
use crate::errors::ErrorResponse;
use crate::ledger::category::Category;
use crate::models::{MessageResponse, ServiceInfo};
use crate::store::TagMatch;
use crate::transaction::models::{
    CreateTransactionDto, CreatedTransactionResponse, TransactionListItem, TransactionResponse,
    UpdateTransactionDto,
};

/// Security scheme modifier for HTTP Basic authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "basic_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Basic)
                        .description(Some("API username and password"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation configuration
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Ledgerkeep API",
        version = "0.1.0",
        description = "Personal ledger: accounts, signed transactions, running balances and budget reconciliation",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    tags(
        (name = "Health", description = "Health and service info"),
        (name = "Accounts", description = "Account management"),
        (name = "Transactions", description = "Transactions with computed closing balances"),
        (name = "Balances", description = "Budget, balance history and tag summaries")
    ),
    paths(
        crate::routes::health_check,
        crate::routes::service_info,
        // Account endpoints
        crate::account::handlers::list_accounts,
        crate::account::handlers::create_account,
        crate::account::handlers::update_account,
        crate::account::handlers::delete_account,
        // Transaction endpoints
        crate::transaction::handlers::list_transactions,
        crate::transaction::handlers::get_transaction,
        crate::transaction::handlers::create_transaction,
        crate::transaction::handlers::update_transaction,
        crate::transaction::handlers::delete_transaction,
        // Balance endpoints
        crate::balance::handlers::balances_by_category,
        crate::balance::handlers::balances_by_time,
        crate::balance::handlers::balances_by_tags,
    ),
    components(
        schemas(
            ErrorResponse,
            MessageResponse,
            ServiceInfo,
            // Account schemas
            AccountResponse,
            CreateAccountDto,
            UpdateAccountDto,
            // Transaction schemas
            Category,
            TagMatch,
            TransactionResponse,
            TransactionListItem,
            CreatedTransactionResponse,
            CreateTransactionDto,
            UpdateTransactionDto,
            // Balance schemas
            BudgetResponse,
            TagBreakdownResponse,
        )
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_ledger_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/transactions",
            "/api/transactions/{transaction_id}",
            "/api/balances/by_category",
            "/api/balances/by_time",
            "/api/balances/by_tags",
            "/api/accounts/{account_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }
}
