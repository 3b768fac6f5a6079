use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::account::models::ACCOUNT_ID_RE;
use crate::errors::AppError;
use crate::models::blank_as_none;
use crate::store::{Bounds, Sort, SortField, SortOrder, TagMatch, TransactionFilter, TransactionQuery};

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 100;

/// Stored transaction document
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Transaction {
    pub id: Uuid,
    pub account_id: String,
    pub amount: Decimal,
    pub timestamp: i64,
    pub category: String,
    pub tags: Vec<String>,
    pub notes: String,
}

/// A validated transaction ready to be inserted; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub account_id: String,
    pub amount: Decimal,
    pub timestamp: i64,
    pub category: String,
    pub tags: Vec<String>,
    pub notes: String,
}

impl NewTransaction {
    pub fn into_transaction(self, id: Uuid) -> Transaction {
        Transaction {
            id,
            account_id: self.account_id,
            amount: self.amount,
            timestamp: self.timestamp,
            category: self.category,
            tags: self.tags,
            notes: self.notes,
        }
    }
}

/// Validated field updates; `None` leaves the stored value untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionChanges {
    pub amount: Option<Decimal>,
    pub timestamp: Option<i64>,
    pub account_id: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub notes: Option<String>,
}

impl TransactionChanges {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.timestamp.is_none()
            && self.account_id.is_none()
            && self.category.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
    }

    pub fn apply_to(&self, tx: &mut Transaction) {
        if let Some(amount) = self.amount {
            tx.amount = amount;
        }
        if let Some(timestamp) = self.timestamp {
            tx.timestamp = timestamp;
        }
        if let Some(account_id) = &self.account_id {
            tx.account_id = account_id.clone();
        }
        if let Some(category) = &self.category {
            tx.category = category.clone();
        }
        if let Some(tags) = &self.tags {
            tx.tags = tags.clone();
        }
        if let Some(notes) = &self.notes {
            tx.notes = notes.clone();
        }
    }
}

/// Trims, drops blanks and de-duplicates. Tags are an unordered set, stored sorted.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

/// Timestamps must be representable as a calendar date.
pub fn validate_timestamp(timestamp: i64) -> Result<i64, AppError> {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .map(|_| timestamp)
        .ok_or_else(|| AppError::ValidationError("timestamp must be valid epoch seconds".to_string()))
}

/// Transaction information returned in responses
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionResponse {
    /// Unique transaction identifier
    pub id: Uuid,
    /// Signed amount: positive is a credit, negative a debit
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = -42.5)]
    pub amount: Decimal,
    /// Occurrence time in epoch seconds
    #[schema(example = 1700000000)]
    pub timestamp: i64,
    /// Account this transaction belongs to
    #[schema(example = "hdfc-savings")]
    pub account_id: String,
    /// Waterfall category
    #[schema(example = "essentials")]
    pub category: String,
    /// Free-form tags
    pub tags: Vec<String>,
    /// Free-text notes
    #[schema(example = "Weekly groceries")]
    pub notes: String,
}

impl From<Transaction> for TransactionResponse {
    fn from(t: Transaction) -> Self {
        Self {
            id: t.id,
            amount: t.amount,
            timestamp: t.timestamp,
            account_id: t.account_id,
            category: t.category,
            tags: t.tags,
            notes: t.notes,
        }
    }
}

/// Transaction list item with its computed closing balance
#[derive(Debug, Serialize, ToSchema)]
pub struct TransactionListItem {
    #[serde(flatten)]
    pub transaction: TransactionResponse,
    /// Balance of the account right after this transaction
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1250.0)]
    pub closing_bal: Decimal,
}

/// Response body for a created transaction
#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedTransactionResponse {
    /// Identifier assigned by the store
    pub id: Uuid,
}

/// Request body for creating a transaction
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateTransactionDto {
    /// Signed, non-zero amount
    #[schema(value_type = f64, example = -42.5)]
    pub amount: Decimal,

    /// Epoch seconds; defaults to now
    #[schema(example = 1700000000)]
    pub timestamp: Option<i64>,

    /// Existing account id
    #[validate(regex(
        path = *ACCOUNT_ID_RE,
        message = "account id should satisfy regex: ^[a-zA-Z0-9-_]+$"
    ))]
    #[schema(example = "hdfc-savings")]
    pub account_id: String,

    /// Category legal for the amount's sign
    #[schema(example = "essentials")]
    pub category: String,

    /// Free-form tags
    #[serde(default)]
    pub tags: Vec<String>,

    /// Free-text notes
    #[serde(default)]
    #[schema(example = "Weekly groceries")]
    pub notes: String,
}

/// Request body for updating a transaction (PATCH - all fields optional)
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateTransactionDto {
    #[schema(value_type = Option<f64>, example = -50.0)]
    pub amount: Option<Decimal>,

    pub timestamp: Option<i64>,

    #[validate(regex(
        path = *ACCOUNT_ID_RE,
        message = "account id should satisfy regex: ^[a-zA-Z0-9-_]+$"
    ))]
    pub account_id: Option<String>,

    #[schema(example = "luxury")]
    pub category: Option<String>,

    pub tags: Option<Vec<String>>,

    pub notes: Option<String>,
}

/// Query parameters for listing transactions
#[derive(Debug, Default, Deserialize, Validate, IntoParams)]
pub struct ListTransactionsQuery {
    /// Minimum amount (inclusive)
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<f64>)]
    pub start_amount: Option<Decimal>,
    /// Maximum amount (inclusive)
    #[serde(default, deserialize_with = "blank_as_none")]
    #[param(value_type = Option<f64>)]
    pub end_amount: Option<Decimal>,
    /// Earliest timestamp (inclusive)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub start_time: Option<i64>,
    /// Latest timestamp (inclusive)
    #[serde(default, deserialize_with = "blank_as_none")]
    pub end_time: Option<i64>,
    /// Exact account match
    pub account_id: Option<String>,
    /// Exact category match (case-insensitive)
    pub category: Option<String>,
    /// Full-text search over notes
    pub notes_hint: Option<String>,
    /// Comma-separated tags
    #[param(example = "food,weekly")]
    pub tags: Option<String>,
    /// How `tags` is matched
    #[serde(default)]
    #[param(value_type = Option<String>, example = "all")]
    pub tag_match: TagMatch,

    /// Maximum results (1-100, default 100)
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 1, max = 100, message = "limit should be a positive int and less than 100 inclusive"))]
    pub limit: Option<i64>,
    /// Number of results to skip
    #[serde(default, deserialize_with = "blank_as_none")]
    #[validate(range(min = 0, message = "skip should be a non-negative int"))]
    pub skip: Option<i64>,
    /// amount, timestamp (default) or category
    pub sort_field: Option<String>,
    /// asc or desc (default)
    pub sort_order: Option<String>,
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl ListTransactionsQuery {
    pub fn sort(&self) -> Result<Sort, AppError> {
        let field = match non_blank(&self.sort_field) {
            None => SortField::default(),
            Some(raw) => SortField::parse(raw).ok_or_else(|| {
                AppError::ValidationError(
                    "sort_field should be one of: [amount timestamp category]".to_string(),
                )
            })?,
        };
        let order = match non_blank(&self.sort_order) {
            None => SortOrder::default(),
            Some(raw) => SortOrder::parse(raw).ok_or_else(|| {
                AppError::ValidationError("sort_order should be one of: [asc desc]".to_string())
            })?,
        };
        Ok(Sort { field, order })
    }

    pub fn filter(&self) -> TransactionFilter {
        let mut filter = TransactionFilter::new()
            .amount(Bounds::new(self.start_amount, self.end_amount))
            .timestamp(Bounds::new(self.start_time, self.end_time));

        if let Some(account_id) = non_blank(&self.account_id) {
            filter = filter.account(account_id);
        }
        if let Some(category) = non_blank(&self.category) {
            filter = filter.category(category);
        }
        if let Some(hint) = non_blank(&self.notes_hint) {
            filter = filter.notes_search(hint);
        }
        if let Some(tags) = non_blank(&self.tags) {
            let tags = normalize_tags(tags.split(',').map(str::to_string).collect());
            filter = filter.tags(tags, self.tag_match);
        }
        filter
    }

    /// Builds the display-page query. Call `validate()` first for range checks.
    pub fn to_query(&self) -> Result<TransactionQuery, AppError> {
        let limit = self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let skip = self.skip.unwrap_or(0).max(0);
        Ok(TransactionQuery {
            filter: self.filter(),
            sort: self.sort()?,
            limit: Some(limit as u64),
            skip: skip as u64,
        })
    }
}

/// Path parameters for transaction ID
#[derive(Debug, Deserialize, IntoParams)]
pub struct TransactionIdPath {
    /// Transaction identifier
    pub transaction_id: String,
}

impl TransactionIdPath {
    pub fn parse(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.transaction_id)
            .map_err(|_| AppError::ValidationError("transaction_id is invalid".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::filter::Predicate;

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![
            " food ".to_string(),
            "travel".to_string(),
            "food".to_string(),
            "".to_string(),
        ]);
        assert_eq!(tags, vec!["food".to_string(), "travel".to_string()]);
    }

    #[test]
    fn test_list_query_defaults() {
        let query = ListTransactionsQuery::default().to_query().unwrap();
        assert_eq!(query.limit, Some(100));
        assert_eq!(query.skip, 0);
        assert_eq!(query.sort.field, SortField::Timestamp);
        assert_eq!(query.sort.order, SortOrder::Desc);
        assert!(query.filter.is_empty());
    }

    #[test]
    fn test_list_query_rejects_unknown_sort_field() {
        let query = ListTransactionsQuery {
            sort_field: Some("notes".to_string()),
            ..Default::default()
        };
        assert!(matches!(query.sort(), Err(AppError::ValidationError(_))));
    }

    #[test]
    fn test_list_query_limit_bounds() {
        let too_big = ListTransactionsQuery {
            limit: Some(101),
            ..Default::default()
        };
        assert!(too_big.validate().is_err());

        let zero = ListTransactionsQuery {
            limit: Some(0),
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let negative_skip = ListTransactionsQuery {
            skip: Some(-1),
            ..Default::default()
        };
        assert!(negative_skip.validate().is_err());
    }

    #[test]
    fn test_list_query_builds_typed_filter() {
        let query = ListTransactionsQuery {
            start_amount: Some(Decimal::from(-100)),
            category: Some("Luxury".to_string()),
            tags: Some("trip, food".to_string()),
            tag_match: TagMatch::Any,
            ..Default::default()
        };
        let filter = query.filter();
        assert!(filter
            .predicates()
            .contains(&Predicate::Category("luxury".to_string())));
        assert!(filter.predicates().contains(&Predicate::Tags {
            tags: vec!["food".to_string(), "trip".to_string()],
            mode: TagMatch::Any,
        }));
    }

    #[test]
    fn test_timestamp_must_be_representable() {
        assert!(validate_timestamp(1_700_000_000).is_ok());
        assert!(validate_timestamp(i64::MAX).is_err());
    }

    #[test]
    fn test_transaction_id_path_rejects_garbage() {
        let path = TransactionIdPath {
            transaction_id: "not-a-uuid".to_string(),
        };
        assert!(path.parse().is_err());
    }
}
