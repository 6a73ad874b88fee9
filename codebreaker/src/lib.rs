//! # Codebreaker
//!
//! Server-side engine for a Mastermind-style codebreaking game.
//!
//! A player starts a game over a symbol pool and a code length; the engine
//! draws a hidden secret from the pool and scores each submitted guess with
//! exact (right symbol, right place) and near (right symbol, wrong place)
//! counts. The secret stays hidden until the game is solved.
//!
//! ## Core Modules
//!
//! - [`game`]: Pool validation, secret generation, scoring and entities
//! - [`engine`]: Game lifecycle manager and per-game actors
//! - [`store`]: Persistence trait with in-memory and PostgreSQL backends
//! - [`db`]: PostgreSQL connection settings
//!
//! ## Example
//!
//! ```
//! use codebreaker::{EngineConfig, GameManager, GameView, store::InMemoryGameStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), codebreaker::GameError> {
//! let manager = GameManager::new(Arc::new(InMemoryGameStore::new()), EngineConfig::default());
//! let game = manager.start_game("0123456789", 4, 1).await?;
//!
//! // Only the view is handed to clients; it omits the secret while active
//! let view: GameView = game.view();
//! assert!(view.secret_code.is_none());
//! # Ok(())
//! # }
//! ```

/// Engine configuration.
pub mod config;
pub use config::{ConfigError, EngineConfig};

/// PostgreSQL connection settings.
pub mod db;

/// Game lifecycle manager and actors.
pub mod engine;
pub use engine::GameManager;

/// Core game logic and entities.
pub mod game;
pub use game::{
    Game, GameError, GameKey, GameResult, GameState, GameView, Guess, GuessKey, PlayerId, Pool,
    Score, evaluate, validate_pool,
};

/// Persistence boundary.
pub mod store;
