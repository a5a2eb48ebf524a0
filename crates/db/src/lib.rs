//! Postgres connectivity for the bookstore service.
//!
//! One [`sqlx::PgPool`] is built at startup and shared by every request;
//! handlers borrow short-lived connections from it.

pub mod migrate;
pub mod pool;

pub use migrate::run_migrations;
pub use pool::connect;
