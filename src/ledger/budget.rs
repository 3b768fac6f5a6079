//! Actual-vs-expected allocation across the waterfall buckets.

use rust_decimal::Decimal;

use super::category::{Category, WATERFALL};
use super::{add_money, sub_money};
use crate::errors::AppError;
use crate::transaction::models::Transaction;

/// One waterfall bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Allocation {
    pub expected: Decimal,
    pub actual: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Budget {
    pub total_income: Decimal,
    pub essentials: Allocation,
    pub investments: Allocation,
    pub savings: Allocation,
    pub luxury: Allocation,
    pub ignorable: Allocation,
}

impl Budget {
    fn bucket_mut(&mut self, category: Category) -> Option<&mut Allocation> {
        match category {
            Category::Essentials => Some(&mut self.essentials),
            Category::Investments => Some(&mut self.investments),
            Category::Savings => Some(&mut self.savings),
            Category::Luxury => Some(&mut self.luxury),
            Category::Ignorable => Some(&mut self.ignorable),
            _ => None,
        }
    }
}

/// Single pass over a windowed transaction set.
///
/// Income is every credit not marked `ignorable`. Debit buckets hold the
/// spend magnitude. Savings is never read from transactions: it is the
/// income left after the other buckets. Categories outside the buckets are
/// skipped, though their credits still count as income.
pub fn compute_budget(transactions: &[Transaction]) -> Result<Budget, AppError> {
    let mut budget = Budget::default();

    for tx in transactions {
        let category = Category::parse(&tx.category);

        if tx.amount > Decimal::ZERO && category != Some(Category::Ignorable) {
            budget.total_income = add_money(budget.total_income, tx.amount)?;
        }

        match category {
            Some(Category::Savings) | None => {}
            Some(c) => {
                if let Some(bucket) = budget.bucket_mut(c) {
                    bucket.actual = sub_money(bucket.actual, tx.amount)?;
                }
            }
        }
    }

    let mut spent = Decimal::ZERO;
    for bucket in [
        budget.essentials,
        budget.investments,
        budget.luxury,
        budget.ignorable,
    ] {
        spent = add_money(spent, bucket.actual)?;
    }
    budget.savings.actual = sub_money(budget.total_income, spent)?;

    let income = budget.total_income;
    for category in WATERFALL {
        let share = category.expected_share().unwrap_or(Decimal::ZERO);
        if let Some(bucket) = budget.bucket_mut(category) {
            bucket.expected = income * share;
        }
    }

    Ok(budget)
}
