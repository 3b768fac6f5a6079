//! PostgreSQL adapter.

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;
use tracing::info;
use uuid::Uuid;

use super::filter::Predicate;
use super::{LedgerStore, SortOrder, TagMatch, TransactionFilter, TransactionQuery};
use crate::account::models::Account;
use crate::errors::AppError;
use crate::ledger::LedgerEntry;
use crate::transaction::models::{NewTransaction, Transaction, TransactionChanges};

const TRANSACTION_COLUMNS: &str =
    r#"id, account_id, amount, "timestamp", category, tags, notes"#;

pub struct PgLedgerStore {
    pool: PgPool,
}

impl PgLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Applies pending schema migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::InternalError(format!("Migration failed: {e}")))?;
        info!("Database migrations applied");
        Ok(())
    }
}

/// Translates the typed filter into a WHERE clause.
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &TransactionFilter) {
    builder.push(" WHERE TRUE");
    for predicate in filter.predicates() {
        match predicate {
            Predicate::Amount(bounds) => {
                if let Some(start) = bounds.start {
                    builder.push(" AND amount >= ").push_bind(start);
                }
                if let Some(end) = bounds.end {
                    builder.push(" AND amount <= ").push_bind(end);
                }
            }
            Predicate::Timestamp(bounds) => {
                if let Some(start) = bounds.start {
                    builder.push(r#" AND "timestamp" >= "#).push_bind(start);
                }
                if let Some(end) = bounds.end {
                    builder.push(r#" AND "timestamp" <= "#).push_bind(end);
                }
            }
            Predicate::Account(account_id) => {
                builder.push(" AND account_id = ").push_bind(account_id.clone());
            }
            Predicate::Category(category) => {
                builder.push(" AND category = ").push_bind(category.clone());
            }
            Predicate::Tags { tags, mode } => {
                let op = match mode {
                    TagMatch::All => " AND tags @> ",
                    TagMatch::Any => " AND tags && ",
                };
                builder.push(op).push_bind(tags.clone()).push("::text[]");
            }
            Predicate::NotesSearch(hint) => {
                builder
                    .push(" AND to_tsvector('simple', notes) @@ plainto_tsquery('simple', ")
                    .push_bind(hint.clone())
                    .push(")");
            }
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_foreign_key_violation())
}

#[async_trait]
impl LedgerStore for PgLedgerStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_account(&self, account: &Account) -> Result<(), AppError> {
        sqlx::query("INSERT INTO accounts (id, name) VALUES ($1, $2)")
            .bind(&account.id)
            .bind(&account.name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    AppError::account_already_exists()
                } else {
                    e.into()
                }
            })?;
        Ok(())
    }

    async fn list_accounts(&self) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>("SELECT id, name FROM accounts ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(accounts)
    }

    async fn account_balances(&self) -> Result<HashMap<String, Decimal>, AppError> {
        let rows = sqlx::query_as::<_, (String, Decimal)>(
            "SELECT account_id, SUM(amount) FROM transactions GROUP BY account_id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn rename_account(&self, account_id: &str, name: &str) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE accounts SET name = $2 WHERE id = $1")
            .bind(account_id)
            .bind(name)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::account_not_found());
        }
        Ok(())
    }

    async fn delete_account(&self, account_id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::account_in_use()
                } else {
                    e.into()
                }
            })?;
        if result.rows_affected() == 0 {
            return Err(AppError::account_not_found());
        }
        Ok(())
    }

    async fn account_exists(&self, account_id: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn account_in_use(&self, account_id: &str) -> Result<bool, AppError> {
        let in_use = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM transactions WHERE account_id = $1)",
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(in_use)
    }

    async fn insert_transaction(&self, new: NewTransaction) -> Result<Transaction, AppError> {
        let sql = format!(
            r#"
            INSERT INTO transactions (id, account_id, amount, "timestamp", category, tags, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(Uuid::now_v7())
            .bind(&new.account_id)
            .bind(new.amount)
            .bind(new.timestamp)
            .bind(&new.category)
            .bind(&new.tags)
            .bind(&new.notes)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::account_not_found()
                } else {
                    e.into()
                }
            })
    }

    async fn get_transaction(&self, id: Uuid) -> Result<Transaction, AppError> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1");
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(AppError::transaction_not_found)
    }

    async fn update_transaction(
        &self,
        id: Uuid,
        changes: &TransactionChanges,
    ) -> Result<Transaction, AppError> {
        let sql = format!(
            r#"
            UPDATE transactions SET
                amount = COALESCE($2, amount),
                "timestamp" = COALESCE($3, "timestamp"),
                account_id = COALESCE($4, account_id),
                category = COALESCE($5, category),
                tags = COALESCE($6, tags),
                notes = COALESCE($7, notes)
            WHERE id = $1
            RETURNING {TRANSACTION_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(id)
            .bind(changes.amount)
            .bind(changes.timestamp)
            .bind(&changes.account_id)
            .bind(&changes.category)
            .bind(&changes.tags)
            .bind(&changes.notes)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    AppError::account_not_found()
                } else {
                    e.into()
                }
            })?
            .ok_or_else(AppError::transaction_not_found)
    }

    async fn delete_transaction(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM transactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::transaction_not_found());
        }
        Ok(())
    }

    async fn list_transactions(
        &self,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions"
        ));
        push_filter(&mut builder, &query.filter);

        let direction = query.sort.order.keyword();
        builder.push(format!(
            r#" ORDER BY "{}" {direction}, id {direction}"#,
            query.sort.field.column()
        ));
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ").push_bind(limit as i64);
        }
        if query.skip > 0 {
            builder.push(" OFFSET ").push_bind(query.skip as i64);
        }

        let transactions = builder
            .build_query_as::<Transaction>()
            .fetch_all(&self.pool)
            .await?;
        Ok(transactions)
    }

    async fn count_transactions(&self, filter: &TransactionFilter) -> Result<u64, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions");
        push_filter(&mut builder, filter);
        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn scan_ledger(&self, order: SortOrder) -> Result<Vec<LedgerEntry>, AppError> {
        let direction = order.keyword();
        let sql = format!(
            r#"SELECT id, account_id, amount, "timestamp" FROM transactions ORDER BY "timestamp" {direction}, id {direction}"#
        );
        let entries = sqlx::query_as::<_, LedgerEntry>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Bounds;

    #[test]
    fn test_filter_translation() {
        let filter = TransactionFilter::new()
            .amount(Bounds::new(Some(Decimal::from(-10)), None))
            .account("cash")
            .tags(vec!["food".to_string()], TagMatch::Any)
            .notes_search("dinner");

        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM transactions");
        push_filter(&mut builder, &filter);
        let sql = builder.sql();

        assert!(sql.contains("amount >= $1"));
        assert!(sql.contains("account_id = $2"));
        assert!(sql.contains("tags && $3::text[]"));
        assert!(sql.contains("plainto_tsquery('simple', $4)"));
    }

    #[test]
    fn test_empty_filter_has_no_predicates() {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT 1 FROM transactions");
        push_filter(&mut builder, &TransactionFilter::new());
        assert_eq!(builder.sql(), "SELECT 1 FROM transactions WHERE TRUE");
    }
}
