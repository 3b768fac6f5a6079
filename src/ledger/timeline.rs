//! Month-bucketed balance history and per-tag totals.

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{add_money, LedgerEntry};
use crate::errors::AppError;
use crate::transaction::models::Transaction;

/// Bucket key for `timestamp`: 00:00:00 UTC on the last day of its UTC month.
pub fn month_end(timestamp: i64) -> Result<i64, AppError> {
    let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(|| AppError::InternalError(format!("timestamp {timestamp} out of range")))?
        .date_naive();

    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    let last_day = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first_of_next| first_of_next.pred_opt())
        .ok_or_else(|| AppError::InternalError(format!("no month end for {timestamp}")))?;

    Ok(last_day.and_time(NaiveTime::MIN).and_utc().timestamp())
}

/// Cumulative balance across all accounts, keyed by month end.
///
/// Each bucket starts from the previous bucket's closing value. Months without
/// transactions get no entry.
pub fn balance_over_time(entries: &[LedgerEntry]) -> Result<BTreeMap<i64, Decimal>, AppError> {
    let mut ordered: Vec<&LedgerEntry> = entries.iter().collect();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.id.cmp(&b.id)));

    let mut series = BTreeMap::new();
    let mut running = Decimal::ZERO;
    for entry in ordered {
        running = add_money(running, entry.amount)?;
        series.insert(month_end(entry.timestamp)?, running);
    }
    Ok(series)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TagBreakdown {
    /// Spend magnitude per tag
    pub debits: BTreeMap<String, Decimal>,
    pub credits: BTreeMap<String, Decimal>,
}

/// Totals per tag. A transaction adds its full amount to each of its tags.
pub fn tag_breakdown(transactions: &[Transaction]) -> Result<TagBreakdown, AppError> {
    let mut breakdown = TagBreakdown::default();
    for tx in transactions {
        let (side, value) = if tx.amount > Decimal::ZERO {
            (&mut breakdown.credits, tx.amount)
        } else {
            (&mut breakdown.debits, -tx.amount)
        };
        for tag in &tx.tags {
            let total = side.entry(tag.clone()).or_insert(Decimal::ZERO);
            *total = add_money(*total, value)?;
        }
    }
    Ok(breakdown)
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn entry(id: u128, amount: i64, timestamp: i64) -> LedgerEntry {
        LedgerEntry {
            id: Uuid::from_u128(id),
            account_id: "A".to_string(),
            amount: Decimal::from(amount),
            timestamp,
        }
    }

    // 2024-01-15, 2024-01-31, 2024-02-10, 2024-04-02 (UTC)
    const JAN_15: i64 = 1_705_276_800;
    const JAN_31: i64 = 1_706_659_200;
    const FEB_10: i64 = 1_707_523_200;
    const APR_02: i64 = 1_712_016_000;
    const FEB_29: i64 = 1_709_164_800;
    const APR_30: i64 = 1_714_435_200;

    #[test]
    fn test_month_end_is_start_of_last_day() {
        assert_eq!(month_end(JAN_15).unwrap(), JAN_31);
        assert_eq!(month_end(JAN_31 + 86_399).unwrap(), JAN_31);
        assert_eq!(month_end(FEB_10).unwrap(), FEB_29);
    }

    #[test]
    fn test_month_end_december_rolls_year() {
        // 2023-12-05 -> 2023-12-31
        assert_eq!(month_end(1_701_734_400).unwrap(), 1_703_980_800);
    }

    #[test]
    fn test_balance_carries_forward_and_skips_gap_months() {
        let series = balance_over_time(&[
            entry(1, 100, JAN_15),
            entry(2, -40, FEB_10),
            entry(3, 5, APR_02),
            entry(4, 10, JAN_31),
        ])
        .unwrap();

        let expected: BTreeMap<i64, Decimal> = [
            (JAN_31, Decimal::from(110)),
            (FEB_29, Decimal::from(70)),
            (APR_30, Decimal::from(75)),
        ]
        .into_iter()
        .collect();
        assert_eq!(series, expected);
    }

    #[test]
    fn test_balance_over_time_empty() {
        assert!(balance_over_time(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_tag_breakdown_splits_by_sign() {
        let tx = |amount: i64, tags: &[&str]| Transaction {
            id: Uuid::now_v7(),
            account_id: "A".to_string(),
            amount: Decimal::from(amount),
            timestamp: 0,
            category: String::new(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            notes: String::new(),
        };
        let breakdown = tag_breakdown(&[
            tx(-30, &["food", "trip"]),
            tx(-20, &["food"]),
            tx(15, &["trip"]),
            tx(-99, &[]),
        ])
        .unwrap();

        assert_eq!(breakdown.debits["food"], Decimal::from(50));
        assert_eq!(breakdown.debits["trip"], Decimal::from(30));
        assert_eq!(breakdown.credits["trip"], Decimal::from(15));
        assert_eq!(breakdown.debits.len(), 2);
    }

    #[test]
    fn test_balance_overflow_is_internal_error() {
        let mut big = entry(1, 1, JAN_15);
        big.amount = Decimal::MAX;
        let mut again = entry(2, 1, FEB_10);
        again.amount = Decimal::MAX;

        let result = balance_over_time(&[big, again]);
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }

    #[test]
    fn test_tag_total_overflow_is_internal_error() {
        let tx = |id: u128| Transaction {
            id: Uuid::from_u128(id),
            account_id: "A".to_string(),
            amount: Decimal::MIN,
            timestamp: 0,
            category: "essentials".to_string(),
            tags: vec!["trip".to_string()],
            notes: String::new(),
        };
        let result = tag_breakdown(&[tx(1), tx(2)]);
        assert!(matches!(result, Err(AppError::InternalError(_))));
    }
}
