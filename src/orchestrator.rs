//! Concurrent fan-out over the store.
//!
//! Every branch runs under the configured per-operation timeout. Branches are
//! joined with `try_join!`: the first failure is returned and the remaining
//! branch futures are dropped, which cancels their in-flight queries.

use futures::try_join;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::account::models::Account;
use crate::errors::AppError;
use crate::ledger::budget::{compute_budget, Budget};
use crate::ledger::closing_balance::{attach_closing_balances, closing_balances};
use crate::ledger::timeline::{balance_over_time, tag_breakdown, TagBreakdown};
use crate::store::{Bounds, LedgerStore, SortOrder, TransactionFilter, TransactionQuery};
use crate::transaction::models::Transaction;

pub struct QueryOrchestrator {
    store: Arc<dyn LedgerStore>,
    timeout: Duration,
}

impl QueryOrchestrator {
    pub fn new(store: Arc<dyn LedgerStore>, timeout: Duration) -> Self {
        Self { store, timeout }
    }

    /// The underlying store, for single-call CRUD paths.
    pub fn store(&self) -> &dyn LedgerStore {
        self.store.as_ref()
    }

    /// Runs one store call under the operation timeout.
    async fn bounded<T, F>(&self, branch: &'static str, call: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => {
                warn!(branch, error = %e, "store branch failed");
                Err(e)
            }
            Err(_) => {
                warn!(branch, timeout_ms = self.timeout.as_millis() as u64, "store branch timed out");
                Err(AppError::InternalError(format!("{branch} query timed out")))
            }
        }
    }

    /// List + Count. The count branch is skipped when not needed.
    pub async fn list_with_count(
        &self,
        query: &TransactionQuery,
        include_count: bool,
    ) -> Result<(Vec<Transaction>, Option<u64>), AppError> {
        let list = self.bounded("list", self.store.list_transactions(query));
        if !include_count {
            return Ok((list.await?, None));
        }
        let count = self.bounded("count", self.store.count_transactions(&query.filter));
        let (transactions, total) = try_join!(list, count)?;
        Ok((transactions, Some(total)))
    }

    /// Display + Full-Ledger: the requested page, its total count, and each
    /// displayed transaction's closing balance from an unfiltered ledger scan.
    pub async fn list_with_closing_balances(
        &self,
        query: &TransactionQuery,
    ) -> Result<(Vec<(Transaction, Decimal)>, u64), AppError> {
        let ((page, total), ledger) = try_join!(
            self.list_with_count(query, true),
            self.bounded("full_ledger", self.store.scan_ledger(SortOrder::Asc)),
        )?;
        debug!(
            displayed = page.len(),
            ledger = ledger.len(),
            "merging display page with full ledger"
        );

        let balances = closing_balances(&ledger)?;
        let items = attach_closing_balances(page, &balances)?;
        Ok((items, total.unwrap_or_default()))
    }

    /// Every transaction inside `window`, oldest first.
    async fn window(&self, window: Bounds<i64>) -> Result<Vec<Transaction>, AppError> {
        let query = TransactionQuery::unbounded(TransactionFilter::new().timestamp(window));
        self.bounded("window", self.store.list_transactions(&query))
            .await
    }

    pub async fn budget(&self, window: Bounds<i64>) -> Result<Budget, AppError> {
        let transactions = self.window(window).await?;
        compute_budget(&transactions)
    }

    pub async fn tag_breakdown(&self, window: Bounds<i64>) -> Result<TagBreakdown, AppError> {
        let transactions = self.window(window).await?;
        tag_breakdown(&transactions)
    }

    pub async fn balance_over_time(&self) -> Result<BTreeMap<i64, Decimal>, AppError> {
        let ledger = self
            .bounded("full_ledger", self.store.scan_ledger(SortOrder::Asc))
            .await?;
        balance_over_time(&ledger)
    }

    /// Accounts paired with the sum of their transactions; unused accounts get zero.
    pub async fn accounts_with_balances(&self) -> Result<Vec<(Account, Decimal)>, AppError> {
        let (accounts, balances) = try_join!(
            self.bounded("accounts", self.store.list_accounts()),
            self.bounded("balances", self.store.account_balances()),
        )?;
        Ok(accounts
            .into_iter()
            .map(|account| {
                let balance = balances.get(&account.id).copied().unwrap_or_default();
                (account, balance)
            })
            .collect())
    }
}
