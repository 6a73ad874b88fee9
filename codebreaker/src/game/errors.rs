//! Game error types.

use crate::store::StoreError;
use thiserror::Error;

/// Why a pool was rejected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolRejection {
    /// Symbol is a whitespace character
    Whitespace(char),
    /// Symbol is an ISO control character
    Control(char),
    /// Symbol is not assigned in the Unicode character database
    Unassigned(char),
    /// No symbols remain to draw a code from
    Empty,
    /// More distinct symbols than the engine allows
    TooLarge { size: usize, max: usize },
}

impl std::fmt::Display for PoolRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PoolRejection::Whitespace(c) => write!(f, "whitespace symbol U+{:04X}", *c as u32),
            PoolRejection::Control(c) => write!(f, "control symbol U+{:04X}", *c as u32),
            PoolRejection::Unassigned(c) => write!(f, "unassigned symbol U+{:04X}", *c as u32),
            PoolRejection::Empty => write!(f, "pool is empty"),
            PoolRejection::TooLarge { size, max } => {
                write!(f, "pool has {size} symbols, at most {max} allowed")
            }
        }
    }
}

/// Game engine errors
#[derive(Debug, Error)]
pub enum GameError {
    /// Pool contains forbidden symbols or reduces to nothing
    #[error("Invalid pool: {reason}")]
    InvalidPool { reason: PoolRejection },

    /// Requested code length is outside the supported range
    #[error("Invalid code length {requested}: must be between 1 and {max}")]
    InvalidCodeLength { requested: usize, max: usize },

    /// Guess length does not match the game's code length
    #[error("Invalid guess length: expected {expected}, got {actual}")]
    InvalidGuessLength { expected: usize, actual: usize },

    /// Game or guess does not exist for this player
    #[error("Not found")]
    NotFound,

    /// Game has already been solved
    #[error("Game already solved")]
    GameAlreadySolved,

    /// Persistence layer failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Game actor stopped before answering
    #[error("Game engine unavailable")]
    EngineUnavailable,
}

impl GameError {
    /// Whether the caller can fix the request and try again
    pub fn is_client_error(&self) -> bool {
        !matches!(self, GameError::Store(_) | GameError::EngineUnavailable)
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store errors are sanitized so database details never reach a player.
    pub fn client_message(&self) -> String {
        match self {
            GameError::Store(_) | GameError::EngineUnavailable => {
                "Internal server error".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl From<PoolRejection> for GameError {
    fn from(reason: PoolRejection) -> Self {
        GameError::InvalidPool { reason }
    }
}

/// Result type for game operations
pub type GameResult<T> = Result<T, GameError>;
