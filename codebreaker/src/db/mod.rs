//! PostgreSQL connection settings.
//!
//! [`DatabaseConfig`] sizes the pool that [`crate::store::PgGameStore::connect`]
//! opens.

pub mod config;

pub use config::DatabaseConfig;
