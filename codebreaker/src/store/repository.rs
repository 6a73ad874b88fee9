//! Store trait definitions for testability and dependency injection.
//!
//! The engine talks to persistence only through [`GameStore`], so concrete
//! backends can be swapped without touching game logic.

use async_trait::async_trait;
use thiserror::Error;

use crate::game::{Game, GameKey, Guess, GuessKey, PlayerId};

/// Store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row could not be decoded into an entity
    #[error("Corrupt record: {0}")]
    CorruptRecord(String),

    /// Append targeted a game the store does not hold
    #[error("Unknown game {0}")]
    UnknownGame(GameKey),

    /// Append targeted a game that is already solved
    #[error("Game {0} is closed")]
    GameClosed(GameKey),

    /// Another writer appended first
    #[error("Append conflict on game {game_key}: expected ordinal {expected}, got {actual}")]
    Conflict {
        game_key: GameKey,
        expected: usize,
        actual: usize,
    },
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for game persistence operations
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Persist a new game with its secret, returning the stored copy
    async fn save(&self, game: &Game) -> StoreResult<Game>;

    /// Find a game by key, only if owned by `player`
    async fn find_game_by_key_and_player(
        &self,
        key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Game>>;

    /// Find a guess by key, only if it belongs to `game_key` owned by `player`
    async fn find_guess_by_key_and_game_key_and_player(
        &self,
        guess_key: GuessKey,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Guess>>;

    /// Guesses of a game owned by `player`, in submission order
    async fn list_guesses_for_game(
        &self,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Vec<Guess>>;

    /// Append a scored guess and persist the game's resulting state
    ///
    /// `game` already reflects the guess (state and solve time). Implementations
    /// must refuse the append if the stored game is solved or if
    /// `guess.ordinal` is not the next position.
    async fn append_guess(&self, game: &Game, guess: &Guess) -> StoreResult<Guess>;
}
