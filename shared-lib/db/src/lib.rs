//! Database utilities and connection pooling for the cashbook services.
//!
//! This crate provides MySQL connection pool management using sqlx.

mod pool;
mod config;

pub use pool::{close_pool, create_pool, health_check, DbPool};
pub use config::DbConfig;

// Re-export sqlx types for convenience
pub use sqlx::{self, MySql, Row};
