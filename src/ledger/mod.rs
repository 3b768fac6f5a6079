//! Ledger computation engine.
//!
//! Pure, synchronous passes over transaction snapshots. Every function here is
//! a deterministic function of its input; fetching is the orchestrator's job.

pub mod budget;
pub mod category;
pub mod closing_balance;
pub mod timeline;

use rust_decimal::Decimal;
use sqlx::FromRow;
use tracing::error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::transaction::models::Transaction;

/// `total + amount`, reporting overflow as an internal error instead of panicking.
pub fn add_money(total: Decimal, amount: Decimal) -> Result<Decimal, AppError> {
    total.checked_add(amount).ok_or_else(overflow)
}

/// `total - amount`, reporting overflow as an internal error instead of panicking.
pub fn sub_money(total: Decimal, amount: Decimal) -> Result<Decimal, AppError> {
    total.checked_sub(amount).ok_or_else(overflow)
}

fn overflow() -> AppError {
    error!("ledger arithmetic overflowed");
    AppError::InternalError("ledger arithmetic overflowed".to_string())
}

/// Minimal projection of a transaction used by the full-ledger passes.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub account_id: String,
    pub amount: Decimal,
    pub timestamp: i64,
}

impl From<&Transaction> for LedgerEntry {
    fn from(t: &Transaction) -> Self {
        Self {
            id: t.id,
            account_id: t.account_id.clone(),
            amount: t.amount,
            timestamp: t.timestamp,
        }
    }
}
