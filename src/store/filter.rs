//! Typed transaction query model.
//!
//! Handlers build a [`TransactionFilter`] from request parameters; each store
//! adapter translates it into its native query language.

use rust_decimal::Decimal;
use serde::Deserialize;
use std::cmp::Ordering;
use utoipa::ToSchema;

use crate::transaction::models::Transaction;

/// Inclusive range with optional ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Bounds<T> {
    pub start: Option<T>,
    pub end: Option<T>,
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(start: Option<T>, end: Option<T>) -> Self {
        Self { start, end }
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, value: T) -> bool {
        self.start.map_or(true, |s| value >= s) && self.end.map_or(true, |e| value <= e)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TagMatch {
    /// Transaction must carry every listed tag
    #[default]
    All,
    /// Transaction must carry at least one listed tag
    Any,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Amount(Bounds<Decimal>),
    Timestamp(Bounds<i64>),
    Account(String),
    Category(String),
    Tags { tags: Vec<String>, mode: TagMatch },
    NotesSearch(String),
}

impl Predicate {
    fn matches(&self, tx: &Transaction) -> bool {
        match self {
            Predicate::Amount(bounds) => bounds.contains(tx.amount),
            Predicate::Timestamp(bounds) => bounds.contains(tx.timestamp),
            Predicate::Account(id) => &tx.account_id == id,
            Predicate::Category(category) => &tx.category == category,
            Predicate::Tags { tags, mode } => match mode {
                TagMatch::All => tags.iter().all(|t| tx.tags.contains(t)),
                TagMatch::Any => tags.iter().any(|t| tx.tags.contains(t)),
            },
            Predicate::NotesSearch(hint) => {
                let words: Vec<String> = search_terms(&tx.notes);
                search_terms(hint).iter().all(|term| words.contains(term))
            }
        }
    }
}

/// Lower-cased alphanumeric terms, the unit both full-text adapters match on.
pub fn search_terms(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Conjunction of predicates. An empty filter matches every transaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionFilter {
    predicates: Vec<Predicate>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn amount(mut self, bounds: Bounds<Decimal>) -> Self {
        if !bounds.is_unbounded() {
            self.predicates.push(Predicate::Amount(bounds));
        }
        self
    }

    pub fn timestamp(mut self, bounds: Bounds<i64>) -> Self {
        if !bounds.is_unbounded() {
            self.predicates.push(Predicate::Timestamp(bounds));
        }
        self
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.predicates.push(Predicate::Account(account_id.into()));
        self
    }

    /// Categories are stored lower-cased, so the value is normalized here.
    pub fn category(mut self, category: &str) -> Self {
        self.predicates
            .push(Predicate::Category(category.to_lowercase()));
        self
    }

    pub fn tags(mut self, tags: Vec<String>, mode: TagMatch) -> Self {
        if !tags.is_empty() {
            self.predicates.push(Predicate::Tags { tags, mode });
        }
        self
    }

    pub fn notes_search(mut self, hint: impl Into<String>) -> Self {
        self.predicates.push(Predicate::NotesSearch(hint.into()));
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    pub fn matches(&self, tx: &Transaction) -> bool {
        self.predicates.iter().all(|p| p.matches(tx))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    Amount,
    #[default]
    Timestamp,
    Category,
}

impl SortField {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "amount" => Some(SortField::Amount),
            "timestamp" => Some(SortField::Timestamp),
            "category" => Some(SortField::Category),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            SortField::Amount => "amount",
            SortField::Timestamp => "timestamp",
            SortField::Category => "category",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Primary sort key. The transaction id is always the secondary key, in the same direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sort {
    pub field: SortField,
    pub order: SortOrder,
}

impl Sort {
    /// (timestamp, id) ascending: the order every running-balance pass needs.
    pub fn chronological() -> Self {
        Self {
            field: SortField::Timestamp,
            order: SortOrder::Asc,
        }
    }

    pub fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let primary = match self.field {
            SortField::Amount => a.amount.cmp(&b.amount),
            SortField::Timestamp => a.timestamp.cmp(&b.timestamp),
            SortField::Category => a.category.cmp(&b.category),
        };
        let ordering = primary.then_with(|| a.id.cmp(&b.id));
        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// One page of a filtered, sorted transaction listing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TransactionQuery {
    pub filter: TransactionFilter,
    pub sort: Sort,
    /// `None` returns every match.
    pub limit: Option<u64>,
    pub skip: u64,
}

impl TransactionQuery {
    /// Every transaction matching `filter`, oldest first.
    pub fn unbounded(filter: TransactionFilter) -> Self {
        Self {
            filter,
            sort: Sort::chronological(),
            limit: None,
            skip: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn tx(id: u128, amount: i64, timestamp: i64, tags: &[&str], notes: &str) -> Transaction {
        Transaction {
            id: Uuid::from_u128(id),
            account_id: "cash".to_string(),
            amount: Decimal::from(amount),
            timestamp,
            category: "essentials".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            notes: notes.to_string(),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = TransactionFilter::new()
            .amount(Bounds::default())
            .timestamp(Bounds::default());
        assert!(filter.is_empty());
        assert!(filter.matches(&tx(1, -5, 10, &[], "")));
    }

    #[test]
    fn test_ranges_are_inclusive() {
        let filter = TransactionFilter::new().timestamp(Bounds::new(Some(10), Some(20)));
        assert!(filter.matches(&tx(1, -5, 10, &[], "")));
        assert!(filter.matches(&tx(1, -5, 20, &[], "")));
        assert!(!filter.matches(&tx(1, -5, 21, &[], "")));

        let filter =
            TransactionFilter::new().amount(Bounds::new(None, Some(Decimal::from(-10))));
        assert!(filter.matches(&tx(1, -10, 0, &[], "")));
        assert!(!filter.matches(&tx(1, -9, 0, &[], "")));
    }

    #[test]
    fn test_tag_match_modes() {
        let t = tx(1, -5, 0, &["food", "weekly"], "");
        let wanted = vec!["food".to_string(), "travel".to_string()];

        assert!(!TransactionFilter::new()
            .tags(wanted.clone(), TagMatch::All)
            .matches(&t));
        assert!(TransactionFilter::new()
            .tags(wanted, TagMatch::Any)
            .matches(&t));
    }

    #[test]
    fn test_notes_search_requires_every_term() {
        let t = tx(1, -5, 0, &[], "Dinner with Sam, downtown");
        assert!(TransactionFilter::new().notes_search("dinner sam").matches(&t));
        assert!(!TransactionFilter::new().notes_search("dinner alex").matches(&t));
    }

    #[test]
    fn test_category_filter_is_normalized() {
        let t = tx(1, -5, 0, &[], "");
        assert!(TransactionFilter::new().category("ESSENTIALS").matches(&t));
    }

    #[test]
    fn test_sort_breaks_ties_by_id_in_same_direction() {
        let a = tx(1, -5, 100, &[], "");
        let b = tx(2, -5, 100, &[], "");

        assert_eq!(Sort::chronological().compare(&a, &b), Ordering::Less);
        let desc = Sort {
            field: SortField::Timestamp,
            order: SortOrder::Desc,
        };
        assert_eq!(desc.compare(&a, &b), Ordering::Greater);
    }

    #[test]
    fn test_sort_field_parse_is_case_insensitive() {
        assert_eq!(SortField::parse("Amount"), Some(SortField::Amount));
        assert_eq!(SortField::parse("notes"), None);
        assert_eq!(SortOrder::parse("ASC"), Some(SortOrder::Asc));
    }
}
