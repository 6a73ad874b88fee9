//! Game lifecycle engine with per-game async actors.
//!
//! This module implements:
//! - GameManager: entry point for starting games, submitting and reading guesses
//! - GameActor: single writer per game, serializing guess evaluation
//! - Message-based communication with tokio channels
//!
//! ## Architecture
//!
//! Each game with submissions in flight gets its own Tokio task with an mpsc
//! inbox. The manager spawns actors on demand and keeps their handles in a
//! registry; an actor retires after sitting idle for the configured timeout.
//! Reads (games, guesses) bypass the actors and hit the store directly.
//!
//! ## Example
//!
//! ```
//! use codebreaker::{EngineConfig, GameManager, store::InMemoryGameStore};
//! use std::sync::Arc;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), codebreaker::GameError> {
//! let manager = GameManager::new(Arc::new(InMemoryGameStore::new()), EngineConfig::default());
//!
//! let game = manager.start_game("ROYGBV", 4, 42).await?;
//! let guess = manager.submit_guess(game.key, "RRGG", 42).await?;
//! assert!(guess.exact_matches + guess.near_matches <= 4);
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod manager;
pub mod messages;

pub use actor::{GameActor, GameHandle};
pub use manager::GameManager;
pub use messages::GameMessage;
