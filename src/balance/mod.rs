pub mod handlers;
pub mod models;

pub use handlers::{balances_by_category, balances_by_tags, balances_by_time};
