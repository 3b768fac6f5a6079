pub mod handlers;
pub mod models;
mod service;

pub use handlers::{
    create_transaction, delete_transaction, get_transaction, list_transactions,
    update_transaction,
};
