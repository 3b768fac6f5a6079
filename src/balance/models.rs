use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use utoipa::{IntoParams, ToSchema};

use crate::errors::AppError;
use crate::ledger::budget::Budget;
use crate::ledger::timeline::TagBreakdown;
use crate::models::blank_as_none;
use crate::store::Bounds;

/// A money value rendered as a JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Amount(#[serde(with = "rust_decimal::serde::float")] pub Decimal);

/// Query parameters bounding a budget or tag window
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct BalanceWindowQuery {
    /// Window start in epoch seconds (default 0)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start_time: Option<i64>,
    /// Window end in epoch seconds (default now)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_time: Option<i64>,
}

impl BalanceWindowQuery {
    /// Inclusive window; an absent start is epoch 0, an absent end is `now`.
    ///
    /// Only an explicitly inverted pair is rejected. A start in the future
    /// with no end yields an empty window.
    pub fn window(&self, now: i64) -> Result<Bounds<i64>, AppError> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(AppError::ValidationError(
                    "start_time should not be after end_time".to_string(),
                ));
            }
        }
        let start = self.start_time.unwrap_or(0);
        let end = self.end_time.unwrap_or(now);
        Ok(Bounds::new(Some(start), Some(end)))
    }
}

/// Actual vs expected allocation across the waterfall
#[derive(Debug, Serialize, ToSchema)]
pub struct BudgetResponse {
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1000.0)]
    pub total_income: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 400.0)]
    pub essentials_expected: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 300.0)]
    pub essentials_actual: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 200.0)]
    pub investments_expected: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 0.0)]
    pub investments_actual: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 200.0)]
    pub savings_expected: Decimal,
    /// Income left after every other bucket
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 600.0)]
    pub savings_actual: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 200.0)]
    pub luxury_expected: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 100.0)]
    pub luxury_actual: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 0.0)]
    pub ignorable_expected: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 0.0)]
    pub ignorable_actual: Decimal,
}

impl From<Budget> for BudgetResponse {
    fn from(b: Budget) -> Self {
        Self {
            total_income: b.total_income,
            essentials_expected: b.essentials.expected,
            essentials_actual: b.essentials.actual,
            investments_expected: b.investments.expected,
            investments_actual: b.investments.actual,
            savings_expected: b.savings.expected,
            savings_actual: b.savings.actual,
            luxury_expected: b.luxury.expected,
            luxury_actual: b.luxury.actual,
            ignorable_expected: b.ignorable.expected,
            ignorable_actual: b.ignorable.actual,
        }
    }
}

/// Cumulative balance keyed by month-end epoch seconds
pub type BalanceOverTimeResponse = BTreeMap<i64, Amount>;

pub fn balance_over_time_response(series: BTreeMap<i64, Decimal>) -> BalanceOverTimeResponse {
    series
        .into_iter()
        .map(|(month_end, balance)| (month_end, Amount(balance)))
        .collect()
}

/// Per-tag totals: spend magnitudes for debits, amounts for credits
#[derive(Debug, Serialize, ToSchema)]
pub struct TagBreakdownResponse {
    #[schema(value_type = HashMap<String, f64>)]
    pub debits: BTreeMap<String, Amount>,
    #[schema(value_type = HashMap<String, f64>)]
    pub credits: BTreeMap<String, Amount>,
}

impl From<TagBreakdown> for TagBreakdownResponse {
    fn from(t: TagBreakdown) -> Self {
        let wrap = |side: BTreeMap<String, Decimal>| {
            side.into_iter()
                .map(|(tag, value)| (tag, Amount(value)))
                .collect()
        };
        Self {
            debits: wrap(t.debits),
            credits: wrap(t.credits),
        }
    }
}
