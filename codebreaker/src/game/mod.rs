//! Core game logic: pool validation, secret generation, scoring and entities.

pub mod entities;
pub mod errors;
pub mod evaluator;
pub mod pool;
pub mod secret;

pub use entities::{Game, GameKey, GameState, GameView, Guess, GuessKey, PlayerId, SecretCode};
pub use errors::{GameError, GameResult, PoolRejection};
pub use evaluator::{Score, evaluate};
pub use pool::{Pool, validate_pool};
pub use secret::{RandomSource, SeededRandom, ThreadRandom, generate_secret};
