use chrono::Utc;
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use super::models::{
    normalize_tags, validate_timestamp, CreateTransactionDto, NewTransaction, Transaction,
    TransactionChanges, UpdateTransactionDto,
};
use crate::errors::AppError;
use crate::ledger::category::{fits_new_amount, validate_amount, validate_category, CategoryError};
use crate::store::LedgerStore;

/// Service layer for transaction business logic.
/// Every rule that needs no stored data is checked before the store is touched.
pub struct TransactionService;

impl TransactionService {
    /// Validates a create request into a storable transaction.
    pub fn prepare_new(dto: CreateTransactionDto, now: i64) -> Result<NewTransaction, AppError> {
        let category = validate_category(&dto.category, dto.amount)?;
        let timestamp = validate_timestamp(dto.timestamp.unwrap_or(now))?;

        Ok(NewTransaction {
            account_id: dto.account_id,
            amount: dto.amount,
            timestamp,
            category: category.as_str().to_string(),
            tags: normalize_tags(dto.tags),
            notes: dto.notes,
        })
    }

    /// Checks that need nothing but the request itself.
    fn precheck_update(dto: &UpdateTransactionDto) -> Result<(), AppError> {
        if dto.amount.is_none()
            && dto.timestamp.is_none()
            && dto.account_id.is_none()
            && dto.category.is_none()
            && dto.tags.is_none()
            && dto.notes.is_none()
        {
            return Err(AppError::ValidationError("no updates provided".to_string()));
        }
        match (dto.amount, &dto.category) {
            (Some(amount), Some(category)) => {
                validate_category(category, amount)?;
            }
            (Some(amount), None) => validate_amount(amount)?,
            _ => {}
        }
        if let Some(timestamp) = dto.timestamp {
            validate_timestamp(timestamp)?;
        }
        Ok(())
    }

    /// Validates an update against the stored transaction.
    ///
    /// A new amount without a new category must keep the current category
    /// legal. A new category is checked against the resulting amount.
    pub fn prepare_changes(
        dto: UpdateTransactionDto,
        current: &Transaction,
    ) -> Result<TransactionChanges, AppError> {
        Self::precheck_update(&dto)?;

        let amount: Decimal = dto.amount.unwrap_or(current.amount);
        let category = match (&dto.category, dto.amount) {
            (Some(category), _) => Some(validate_category(category, amount)?.as_str().to_string()),
            (None, Some(new_amount)) => {
                if !fits_new_amount(&current.category, new_amount) {
                    return Err(CategoryError::AmountCategoryMismatch.into());
                }
                None
            }
            (None, None) => None,
        };

        let account_id = dto.account_id.filter(|id| *id != current.account_id);

        Ok(TransactionChanges {
            amount: dto.amount,
            timestamp: dto.timestamp,
            account_id,
            category,
            tags: dto.tags.map(normalize_tags),
            notes: dto.notes,
        })
    }

    pub async fn create_transaction(
        store: &dyn LedgerStore,
        dto: CreateTransactionDto,
    ) -> Result<Transaction, AppError> {
        let new = Self::prepare_new(dto, Utc::now().timestamp())?;

        if !store.account_exists(&new.account_id).await? {
            return Err(AppError::account_not_found());
        }

        let transaction = store.insert_transaction(new).await?;
        info!(transaction_id = %transaction.id, account_id = %transaction.account_id, "transaction created");
        Ok(transaction)
    }

    pub async fn get_transaction(store: &dyn LedgerStore, id: Uuid) -> Result<Transaction, AppError> {
        store.get_transaction(id).await
    }

    pub async fn update_transaction(
        store: &dyn LedgerStore,
        id: Uuid,
        dto: UpdateTransactionDto,
    ) -> Result<Transaction, AppError> {
        Self::precheck_update(&dto)?;

        let current = store.get_transaction(id).await?;
        let changes = Self::prepare_changes(dto, &current)?;
        if changes.is_empty() {
            return Ok(current);
        }

        if let Some(account_id) = &changes.account_id {
            if !store.account_exists(account_id).await? {
                return Err(AppError::account_not_found());
            }
        }

        let updated = store.update_transaction(id, &changes).await?;
        info!(transaction_id = %id, "transaction updated");
        Ok(updated)
    }

    pub async fn delete_transaction(store: &dyn LedgerStore, id: Uuid) -> Result<(), AppError> {
        store.delete_transaction(id).await?;
        info!(transaction_id = %id, "transaction deleted");
        Ok(())
    }
}
