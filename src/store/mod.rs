//! Persistence boundary for accounts and transactions.
//!
//! The ledger engine only talks to a [`LedgerStore`]. The PostgreSQL adapter
//! backs production, the in-memory adapter backs tests and local runs.

pub mod filter;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use uuid::Uuid;

use crate::account::models::Account;
use crate::errors::AppError;
use crate::ledger::LedgerEntry;
use crate::transaction::models::{NewTransaction, Transaction, TransactionChanges};

pub use filter::{Bounds, Sort, SortField, SortOrder, TagMatch, TransactionFilter, TransactionQuery};
pub use memory::MemoryLedgerStore;
pub use postgres::PgLedgerStore;

/// Store operations the service relies on.
///
/// Not-found conditions on single-document operations are reported as
/// `AppError::NotFound` with the matching code, so callers can tell them
/// apart from infrastructure failures.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Cheap connectivity check.
    async fn ping(&self) -> Result<(), AppError>;

    /// Fails with `ACCOUNT_ALREADY_EXISTS` on a duplicate id.
    async fn insert_account(&self, account: &Account) -> Result<(), AppError>;
    async fn list_accounts(&self) -> Result<Vec<Account>, AppError>;
    /// Sum of transaction amounts grouped by account id.
    async fn account_balances(&self) -> Result<HashMap<String, Decimal>, AppError>;
    async fn rename_account(&self, account_id: &str, name: &str) -> Result<(), AppError>;
    async fn delete_account(&self, account_id: &str) -> Result<(), AppError>;
    async fn account_exists(&self, account_id: &str) -> Result<bool, AppError>;
    /// True if any transaction references the account.
    async fn account_in_use(&self, account_id: &str) -> Result<bool, AppError>;

    /// Assigns the transaction id and returns the stored document.
    async fn insert_transaction(&self, new: NewTransaction) -> Result<Transaction, AppError>;
    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, AppError>;
    async fn update_transaction(
        &self,
        id: Uuid,
        changes: &TransactionChanges,
    ) -> Result<Transaction, AppError>;
    async fn delete_transaction(&self, id: Uuid) -> Result<(), AppError>;

    /// Filtered, sorted, paginated listing.
    async fn list_transactions(&self, query: &TransactionQuery)
        -> Result<Vec<Transaction>, AppError>;
    async fn count_transactions(&self, filter: &TransactionFilter) -> Result<u64, AppError>;
    /// Unfiltered scan of every transaction, projected to ledger entries and
    /// ordered by (timestamp, id) in the requested direction.
    async fn scan_ledger(&self, order: SortOrder) -> Result<Vec<LedgerEntry>, AppError>;
}
