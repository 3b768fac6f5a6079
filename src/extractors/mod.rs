mod auth;

pub use auth::{ApiCredentials, BasicAuth};
