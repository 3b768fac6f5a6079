//! The fixed category waterfall.
//!
//! Every transaction carries exactly one category. Debits and credits draw
//! from disjoint vocabularies that share a single member, `ignorable`, which
//! marks movements expected to net to zero (e.g. transfers between accounts).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Essentials,
    Investments,
    Savings,
    Luxury,
    Earnings,
    Refunds,
    Returns,
    Petty,
    Ignorable,
}

/// Categories a debit (negative amount) may carry.
pub const DEBIT_CATEGORIES: [Category; 5] = [
    Category::Essentials,
    Category::Investments,
    Category::Savings,
    Category::Luxury,
    Category::Ignorable,
];

/// Categories a credit (positive amount) may carry.
pub const CREDIT_CATEGORIES: [Category; 5] = [
    Category::Earnings,
    Category::Refunds,
    Category::Returns,
    Category::Petty,
    Category::Ignorable,
];

/// Largest accepted transaction magnitude. Keeps every running sum far from
/// the `Decimal` range limit.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Budget buckets, in waterfall order.
pub const WATERFALL: [Category; 5] = [
    Category::Essentials,
    Category::Investments,
    Category::Savings,
    Category::Luxury,
    Category::Ignorable,
];

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Essentials => "essentials",
            Category::Investments => "investments",
            Category::Savings => "savings",
            Category::Luxury => "luxury",
            Category::Earnings => "earnings",
            Category::Refunds => "refunds",
            Category::Returns => "returns",
            Category::Petty => "petty",
            Category::Ignorable => "ignorable",
        }
    }

    /// Case-insensitive lookup.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "essentials" => Some(Category::Essentials),
            "investments" => Some(Category::Investments),
            "savings" => Some(Category::Savings),
            "luxury" => Some(Category::Luxury),
            "earnings" => Some(Category::Earnings),
            "refunds" => Some(Category::Refunds),
            "returns" => Some(Category::Returns),
            "petty" => Some(Category::Petty),
            "ignorable" => Some(Category::Ignorable),
            _ => None,
        }
    }

    /// Share of total income this bucket is expected to absorb.
    /// `None` for credit-only categories, which are not budget buckets.
    pub fn expected_share(&self) -> Option<Decimal> {
        match self {
            Category::Essentials => Some(Decimal::new(4, 1)),
            Category::Investments => Some(Decimal::new(2, 1)),
            Category::Savings => Some(Decimal::new(2, 1)),
            Category::Luxury => Some(Decimal::new(2, 1)),
            Category::Ignorable => Some(Decimal::ZERO),
            _ => None,
        }
    }

    pub fn is_debit(&self) -> bool {
        DEBIT_CATEGORIES.contains(self)
    }

    pub fn is_credit(&self) -> bool {
        CREDIT_CATEGORIES.contains(self)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reasons a category/amount pair is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryError {
    InvalidAmount,
    AmountOutOfRange,
    InvalidCategory,
    AmountCategoryMismatch,
}

impl fmt::Display for CategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryError::InvalidAmount => write!(f, "amount should be non-zero"),
            CategoryError::AmountOutOfRange => write!(
                f,
                "amount magnitude should not exceed {MAX_AMOUNT}"
            ),
            CategoryError::InvalidCategory => write!(
                f,
                "allowed categories for debits: {}, and for credits: {}",
                join(&DEBIT_CATEGORIES),
                join(&CREDIT_CATEGORIES)
            ),
            CategoryError::AmountCategoryMismatch => {
                write!(f, "amount not compatible with current category")
            }
        }
    }
}

impl From<CategoryError> for AppError {
    fn from(err: CategoryError) -> Self {
        AppError::ValidationError(err.to_string())
    }
}

fn join(categories: &[Category]) -> String {
    categories
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Legal categories for an amount: the credit set when positive, otherwise the debit set.
pub fn legal_categories(amount: Decimal) -> &'static [Category] {
    if amount > Decimal::ZERO {
        &CREDIT_CATEGORIES
    } else {
        &DEBIT_CATEGORIES
    }
}

pub fn validate_amount(amount: Decimal) -> Result<(), CategoryError> {
    if amount.is_zero() {
        return Err(CategoryError::InvalidAmount);
    }
    if amount.abs() > MAX_AMOUNT {
        return Err(CategoryError::AmountOutOfRange);
    }
    Ok(())
}

/// Validates a category against the sign of `amount` and returns it normalized.
pub fn validate_category(category: &str, amount: Decimal) -> Result<Category, CategoryError> {
    validate_amount(amount)?;
    Category::parse(category)
        .filter(|c| legal_categories(amount).contains(c))
        .ok_or(CategoryError::InvalidCategory)
}

/// Case-insensitive legality test. A zero amount is never legal.
pub fn is_legal(category: &str, amount: Decimal) -> bool {
    validate_category(category, amount).is_ok()
}

/// Whether an existing category still fits once the amount changes to `new_amount`.
pub fn fits_new_amount(current: &str, new_amount: Decimal) -> bool {
    match Category::parse(current) {
        Some(c) => {
            (c.is_credit() && new_amount > Decimal::ZERO)
                || (c.is_debit() && new_amount < Decimal::ZERO)
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waterfall_shares_sum_to_one() {
        let total: Decimal = WATERFALL
            .iter()
            .map(|c| c.expected_share().unwrap())
            .sum();
        assert_eq!(total, Decimal::ONE);
    }

    #[test]
    fn test_credit_only_categories_have_no_share() {
        for c in [
            Category::Earnings,
            Category::Refunds,
            Category::Returns,
            Category::Petty,
        ] {
            assert!(c.expected_share().is_none(), "{c} should not be a bucket");
        }
    }

    #[test]
    fn test_legal_categories_by_sign() {
        assert_eq!(legal_categories(Decimal::from(5)), &CREDIT_CATEGORIES);
        assert_eq!(legal_categories(Decimal::from(-5)), &DEBIT_CATEGORIES);
    }

    #[test]
    fn test_validation_is_case_insensitive() {
        assert!(is_legal("ESSENTIALS", Decimal::from(-10)));
        assert!(is_legal("Earnings", Decimal::from(10)));
        assert_eq!(
            validate_category("LuXuRy", Decimal::from(-1)),
            Ok(Category::Luxury)
        );
    }

    #[test]
    fn test_wrong_sign_is_rejected() {
        assert!(!is_legal("essentials", Decimal::from(10)));
        assert!(!is_legal("earnings", Decimal::from(-10)));
        assert!(!is_legal("groceries", Decimal::from(-10)));
    }

    #[test]
    fn test_ignorable_is_legal_for_both_signs() {
        assert!(is_legal("ignorable", Decimal::from(10)));
        assert!(is_legal("ignorable", Decimal::from(-10)));
    }

    #[test]
    fn test_zero_amount_is_always_invalid() {
        for c in CREDIT_CATEGORIES.iter().chain(DEBIT_CATEGORIES.iter()) {
            assert!(!is_legal(c.as_str(), Decimal::ZERO));
        }
        assert_eq!(
            validate_category("ignorable", Decimal::ZERO),
            Err(CategoryError::InvalidAmount)
        );
    }

    #[test]
    fn test_amount_magnitude_is_bounded() {
        assert_eq!(MAX_AMOUNT, Decimal::from(1_000_000_000_000_000i64));
        assert!(validate_amount(MAX_AMOUNT).is_ok());
        assert!(validate_amount(-MAX_AMOUNT).is_ok());

        let huge = Decimal::from_str_exact("60000000000000000000000000000").unwrap();
        assert_eq!(validate_amount(huge), Err(CategoryError::AmountOutOfRange));
        assert_eq!(
            validate_category("earnings", MAX_AMOUNT + Decimal::ONE),
            Err(CategoryError::AmountOutOfRange)
        );
        assert_eq!(
            CategoryError::AmountOutOfRange.to_string(),
            "amount magnitude should not exceed 1000000000000000"
        );
    }

    #[test]
    fn test_fits_new_amount() {
        assert!(!fits_new_amount("essentials", Decimal::from(50)));
        assert!(fits_new_amount("essentials", Decimal::from(-50)));
        assert!(fits_new_amount("ignorable", Decimal::from(50)));
        assert!(fits_new_amount("ignorable", Decimal::from(-50)));
        assert!(!fits_new_amount("unknown", Decimal::from(-50)));
    }

    #[test]
    fn test_mismatch_message() {
        assert_eq!(
            CategoryError::AmountCategoryMismatch.to_string(),
            "amount not compatible with current category"
        );
    }
}
