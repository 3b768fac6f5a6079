//! Running closing balance per account.

use rust_decimal::Decimal;
use std::collections::HashMap;
use tracing::error;
use uuid::Uuid;

use super::{add_money, LedgerEntry};
use crate::errors::AppError;
use crate::transaction::models::Transaction;

/// Maps every transaction id to its account's balance right after it.
///
/// Entries are ordered by (timestamp, id) before the pass, so the result does
/// not depend on input order. Already-sorted input sorts in linear time.
pub fn closing_balances(entries: &[LedgerEntry]) -> Result<HashMap<Uuid, Decimal>, AppError> {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let mut running: HashMap<&str, Decimal> = HashMap::new();
    let mut balances = HashMap::with_capacity(ordered.len());
    for entry in ordered {
        let total = running
            .entry(entry.account_id.as_str())
            .or_insert(Decimal::ZERO);
        *total = add_money(*total, entry.amount)?;
        balances.insert(entry.id, *total);
    }
    Ok(balances)
}

/// Pairs each displayed transaction with its closing balance.
///
/// A displayed id absent from the full-ledger map means the two reads saw
/// different data; that is reported as an internal error, never as zero.
pub fn attach_closing_balances(
    display: Vec<Transaction>,
    balances: &HashMap<Uuid, Decimal>,
) -> Result<Vec<(Transaction, Decimal)>, AppError> {
    display
        .into_iter()
        .map(|tx| match balances.get(&tx.id) {
            Some(balance) => Ok((tx, *balance)),
            None => {
                error!(transaction_id = %tx.id, "closing balance missing for displayed transaction");
                Err(AppError::InternalError(format!(
                    "closing balance missing for transaction {}",
                    tx.id
                )))
            }
        })
        .collect()
}
