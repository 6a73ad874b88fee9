//! Persistence boundary for games and guesses.
//!
//! The engine consumes the [`GameStore`] trait. Two implementations ship with
//! the crate:
//! - [`InMemoryGameStore`]: shared map, used in tests and single-process setups
//! - [`PgGameStore`]: PostgreSQL via sqlx, schema in `migrations/`

pub mod memory;
pub mod postgres;
pub mod repository;

pub use memory::InMemoryGameStore;
pub use postgres::PgGameStore;
pub use repository::{GameStore, StoreError, StoreResult};
