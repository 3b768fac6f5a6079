use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

lazy_static! {
    /// Account identifiers are caller-assigned and URL-safe.
    pub static ref ACCOUNT_ID_RE: Regex = Regex::new(r"^[a-zA-Z0-9_-]+$").expect("Invalid account id pattern");
    /// Display names additionally allow spaces.
    pub static ref ACCOUNT_NAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_\- ]+$").expect("Invalid account name pattern");
}

fn validate_not_blank(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Database entity for accounts
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Account {
    pub id: String,
    pub name: String,
}

/// Account information returned in responses
#[derive(Debug, Serialize, ToSchema)]
pub struct AccountResponse {
    /// Caller-assigned account identifier
    #[schema(example = "hdfc-savings")]
    pub id: String,
    /// Display name
    #[schema(example = "HDFC Savings")]
    pub name: String,
    /// Sum of every transaction on the account
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1500.0)]
    pub balance: Decimal,
}

impl AccountResponse {
    pub fn from_account(account: Account, balance: Decimal) -> Self {
        Self {
            id: account.id,
            name: account.name,
            balance,
        }
    }
}

/// Request body for creating an account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAccountDto {
    /// Unique identifier
    #[validate(regex(
        path = *ACCOUNT_ID_RE,
        message = "account id should satisfy regex: ^[a-zA-Z0-9-_]+$"
    ))]
    #[schema(example = "hdfc-savings")]
    pub id: String,

    /// Display name
    #[validate(regex(
        path = *ACCOUNT_NAME_RE,
        message = "account name should satisfy regex: ^[a-zA-Z0-9-_ ]+$"
    ))]
    #[validate(custom(
        function = "validate_not_blank",
        message = "account name should not be blank"
    ))]
    #[schema(example = "HDFC Savings")]
    pub name: String,
}

impl From<CreateAccountDto> for Account {
    fn from(dto: CreateAccountDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name.trim().to_string(),
        }
    }
}

/// Request body for renaming an account
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAccountDto {
    #[validate(regex(
        path = *ACCOUNT_NAME_RE,
        message = "account name should satisfy regex: ^[a-zA-Z0-9-_ ]+$"
    ))]
    #[validate(custom(
        function = "validate_not_blank",
        message = "account name should not be blank"
    ))]
    #[schema(example = "HDFC Salary")]
    pub name: String,
}

/// Path parameters for account ID
#[derive(Debug, Deserialize, Validate, IntoParams)]
pub struct AccountIdPath {
    /// Account identifier
    #[validate(regex(
        path = *ACCOUNT_ID_RE,
        message = "account id should satisfy regex: ^[a-zA-Z0-9-_]+$"
    ))]
    pub account_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_id_pattern() {
        assert!(ACCOUNT_ID_RE.is_match("hdfc_savings-01"));
        assert!(!ACCOUNT_ID_RE.is_match("hdfc savings"));
        assert!(!ACCOUNT_ID_RE.is_match(""));
    }

    #[test]
    fn test_create_dto_validation() {
        let ok = CreateAccountDto {
            id: "cash".to_string(),
            name: "Cash in hand".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_name = CreateAccountDto {
            id: "cash".to_string(),
            name: "Cash!".to_string(),
        };
        assert!(bad_name.validate().is_err());

        let bad_id = CreateAccountDto {
            id: "cash/1".to_string(),
            name: "Cash".to_string(),
        };
        assert!(bad_id.validate().is_err());
    }

    #[test]
    fn test_blank_names_are_rejected() {
        let create = CreateAccountDto {
            id: "cash".to_string(),
            name: "   ".to_string(),
        };
        assert!(create.validate().is_err());

        let rename = UpdateAccountDto {
            name: "  ".to_string(),
        };
        assert!(rename.validate().is_err());

        let padded = UpdateAccountDto {
            name: " Wallet ".to_string(),
        };
        assert!(padded.validate().is_ok());
    }

    #[test]
    fn test_account_id_path_validation() {
        let ok = AccountIdPath {
            account_id: "hdfc-savings".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad = AccountIdPath {
            account_id: "hdfc savings!".to_string(),
        };
        assert!(bad.validate().is_err());
    }
}
