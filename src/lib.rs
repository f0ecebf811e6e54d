pub mod database;
pub mod error;
pub mod handlers;
pub mod listing;
pub mod query;
pub mod wiki;
