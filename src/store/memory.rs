//! In-process store used by the test suite and `LEDGER_STORE=memory`.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{LedgerStore, SortOrder, TransactionFilter, TransactionQuery};
use crate::account::models::Account;
use crate::errors::AppError;
use crate::ledger::{add_money, LedgerEntry};
use crate::transaction::models::{NewTransaction, Transaction, TransactionChanges};

#[derive(Default)]
struct Collections {
    accounts: BTreeMap<String, Account>,
    transactions: BTreeMap<Uuid, Transaction>,
}

/// Two collections behind one lock, so referential checks see a consistent view.
#[derive(Default)]
pub struct MemoryLedgerStore {
    inner: RwLock<Collections>,
}

impl MemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedgerStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.contains_key(&account.id) {
            return Err(AppError::account_already_exists());
        }
        inner.accounts.insert(account.id.clone(), account.clone());
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        Ok(self.inner.read().await.accounts.values().cloned().collect())
    }

    async fn account_balances(&self) -> Result<HashMap<String, Decimal>, AppError> {
        let inner = self.inner.read().await;
        let mut balances: HashMap<String, Decimal> = HashMap::new();
        for tx in inner.transactions.values() {
            let total = balances.entry(tx.account_id.clone()).or_insert(Decimal::ZERO);
            *total = add_money(*total, tx.amount)?;
        }
        Ok(balances)
    }

    async fn rename_account(&self, account_id: &str, name: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        let account = inner
            .accounts
            .get_mut(account_id)
            .ok_or_else(AppError::account_not_found)?;
        account.name = name.to_string();
        Ok(())
    }

    async fn delete_account(&self, account_id: &str) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        if inner
            .transactions
            .values()
            .any(|tx| tx.account_id == account_id)
        {
            return Err(AppError::account_in_use());
        }
        inner
            .accounts
            .remove(account_id)
            .map(|_| ())
            .ok_or_else(AppError::account_not_found)
    }

    async fn account_exists(&self, account_id: &str) -> Result<bool, AppError> {
        Ok(self.inner.read().await.accounts.contains_key(account_id))
    }

    async fn account_in_use(&self, account_id: &str) -> Result<bool, AppError> {
        Ok(self
            .inner
            .read()
            .await
            .transactions
            .values()
            .any(|tx| tx.account_id == account_id))
    }

    async fn insert_transaction(&self, new: NewTransaction) -> Result<Transaction, AppError> {
        let mut inner = self.inner.write().await;
        if !inner.accounts.contains_key(&new.account_id) {
            return Err(AppError::account_not_found());
        }
        let tx = new.into_transaction(Uuid::now_v7());
        inner.transactions.insert(tx.id, tx.clone());
        Ok(tx)
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, AppError> {
        self.inner
            .read()
            .await
            .transactions
            .get(&id)
            .cloned()
            .ok_or_else(AppError::transaction_not_found)
    }

    async fn update_transaction(
        &self,
        id: Uuid,
        changes: &TransactionChanges,
    ) -> Result<Transaction, AppError> {
        let mut inner = self.inner.write().await;
        if let Some(account_id) = &changes.account_id {
            if !inner.accounts.contains_key(account_id) {
                return Err(AppError::account_not_found());
            }
        }
        let tx = inner
            .transactions
            .get_mut(&id)
            .ok_or_else(AppError::transaction_not_found)?;
        changes.apply_to(tx);
        Ok(tx.clone())
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), AppError> {
        self.inner
            .write()
            .await
            .transactions
            .remove(&id)
            .map(|_| ())
            .ok_or_else(AppError::transaction_not_found)
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, AppError> {
        let inner = self.inner.read().await;
        let mut matched: Vec<&Transaction> = inner
            .transactions
            .values()
            .filter(|tx| query.filter.matches(tx))
            .collect();
        matched.sort_by(|a, b| query.sort.compare(a, b));

        let page = matched.into_iter().skip(query.skip as usize);
        let page: Vec<Transaction> = match query.limit {
            Some(limit) => page.take(limit as usize).cloned().collect(),
            None => page.cloned().collect(),
        };
        Ok(page)
    }

    async fn count_transactions(&self, filter: &TransactionFilter) -> Result<u64, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .transactions
            .values()
            .filter(|tx| filter.matches(tx))
            .count() as u64)
    }

    async fn scan_ledger(&self, order: SortOrder) -> Result<Vec<LedgerEntry>, AppError> {
        let inner = self.inner.read().await;
        let mut entries: Vec<LedgerEntry> =
            inner.transactions.values().map(LedgerEntry::from).collect();
        entries.sort_by(|a, b| {
            let ordering = a
                .timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.id.cmp(&b.id));
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        Ok(entries)
    }
}
