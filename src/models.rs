use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use utoipa::ToSchema;

/// Treats an absent or blank query value as `None`.
pub fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("invalid value '{s}': {e}"))),
    }
}

/// Acknowledgement for mutations that return no document
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Success message
    #[schema(example = "Account deleted successfully")]
    pub message: String,
    /// Affected resource ID
    #[schema(example = "hdfc-savings")]
    pub id: String,
}

impl MessageResponse {
    pub fn new(message: &str, id: impl ToString) -> Self {
        Self {
            message: message.to_string(),
            id: id.to_string(),
        }
    }
}

/// Service name and version
#[derive(Debug, Serialize, ToSchema)]
pub struct ServiceInfo {
    #[schema(example = "ledgerkeep")]
    pub name: &'static str,
    #[schema(example = "0.1.0")]
    pub version: &'static str,
}

impl ServiceInfo {
    pub fn current() -> Self {
        Self {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
