pub mod account;
pub mod balance;
pub mod config;
pub mod errors;
pub mod extractors;
pub mod ledger;
pub mod models;
pub mod openapi;
pub mod orchestrator;
pub mod routes;
pub mod store;
pub mod transaction;
