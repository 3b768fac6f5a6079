use tracing::info;

use super::models::{Account, CreateAccountDto, UpdateAccountDto};
use crate::errors::AppError;
use crate::store::LedgerStore;

/// Service layer for account business logic.
pub struct AccountService;

impl AccountService {
    /// Create an account. Duplicate ids are a conflict.
    pub async fn create_account(
        store: &dyn LedgerStore,
        dto: CreateAccountDto,
    ) -> Result<Account, AppError> {
        let account = Account::from(dto);
        store.insert_account(&account).await?;
        info!(account_id = %account.id, "account created");
        Ok(account)
    }

    pub async fn rename_account(
        store: &dyn LedgerStore,
        account_id: &str,
        dto: &UpdateAccountDto,
    ) -> Result<Account, AppError> {
        let name = dto.name.trim();
        store.rename_account(account_id, name).await?;
        Ok(Account {
            id: account_id.to_string(),
            name: name.to_string(),
        })
    }

    /// Delete an account. Refused while any transaction references it.
    pub async fn delete_account(store: &dyn LedgerStore, account_id: &str) -> Result<(), AppError> {
        if !store.account_exists(account_id).await? {
            return Err(AppError::account_not_found());
        }
        if store.account_in_use(account_id).await? {
            return Err(AppError::account_in_use());
        }
        store.delete_account(account_id).await?;
        info!(account_id, "account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryLedgerStore;
    use crate::transaction::models::NewTransaction;
    use rust_decimal::Decimal;

    fn dto(id: &str) -> CreateAccountDto {
        CreateAccountDto {
            id: id.to_string(),
            name: " Daily Cash ".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_trims_name_and_rejects_duplicates() {
        let store = MemoryLedgerStore::new();
        let account = AccountService::create_account(&store, dto("cash")).await.unwrap();
        assert_eq!(account.name, "Daily Cash");

        let err = AccountService::create_account(&store, dto("cash"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_ALREADY_EXISTS");
    }

    #[tokio::test]
    async fn test_delete_in_use_account_is_conflict() {
        let store = MemoryLedgerStore::new();
        AccountService::create_account(&store, dto("cash")).await.unwrap();
        store
            .insert_transaction(NewTransaction {
                account_id: "cash".to_string(),
                amount: Decimal::from(-3),
                timestamp: 1,
                category: "luxury".to_string(),
                tags: vec![],
                notes: String::new(),
            })
            .await
            .unwrap();

        let err = AccountService::delete_account(&store, "cash").await.unwrap_err();
        assert_eq!(err.code(), "ACCOUNT_IS_IN_USE");
    }

    #[tokio::test]
    async fn test_rename_and_delete_unknown_account() {
        let store = MemoryLedgerStore::new();
        let rename = UpdateAccountDto {
            name: "New".to_string(),
        };
        assert_eq!(
            AccountService::rename_account(&store, "ghost", &rename)
                .await
                .unwrap_err()
                .code(),
            "ACCOUNT_NOT_FOUND"
        );
        assert_eq!(
            AccountService::delete_account(&store, "ghost")
                .await
                .unwrap_err()
                .code(),
            "ACCOUNT_NOT_FOUND"
        );
    }
}
