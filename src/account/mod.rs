pub mod handlers;
pub mod models;
mod service;

pub use handlers::{create_account, delete_account, list_accounts, update_account};
