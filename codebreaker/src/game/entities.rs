//! Game and guess entities.

use super::{evaluator::Score, pool::Pool};
use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Player identity supplied by the identity provider
pub type PlayerId = i64;

/// Game key type
pub type GameKey = Uuid;

/// Guess key type
pub type GuessKey = Uuid;

/// Hidden code a player must deduce.
///
/// Not `Serialize`, and `Debug` output is redacted. Stores read the code
/// through [`SecretCode::expose`].
#[derive(Clone, PartialEq, Eq)]
pub struct SecretCode(Vec<char>);

impl SecretCode {
    pub fn new(symbols: Vec<char>) -> Self {
        Self(symbols)
    }

    pub fn symbols(&self) -> &[char] {
        &self.0
    }

    /// Code length in symbols
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Render the code as a string, for persistence or a solved-game reveal
    pub fn expose(&self) -> String {
        self.0.iter().collect()
    }
}

impl std::fmt::Debug for SecretCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SecretCode(<redacted>)")
    }
}

impl From<&str> for SecretCode {
    fn from(code: &str) -> Self {
        Self(code.chars().collect())
    }
}

/// Game lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameState {
    Active,
    Solved,
}

impl GameState {
    pub fn is_solved(&self) -> bool {
        matches!(self, GameState::Solved)
    }
}

impl std::fmt::Display for GameState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameState::Active => write!(f, "active"),
            GameState::Solved => write!(f, "solved"),
        }
    }
}

impl std::str::FromStr for GameState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(GameState::Active),
            "solved" => Ok(GameState::Solved),
            other => Err(format!("unknown game state '{other}'")),
        }
    }
}

/// A scored guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guess {
    pub key: GuessKey,
    pub game_key: GameKey,
    /// 0-based submission position within the game
    pub ordinal: usize,
    pub text: String,
    pub exact_matches: usize,
    pub near_matches: usize,
    pub created_at: DateTime<Utc>,
}

impl Guess {
    pub fn score(&self) -> Score {
        Score {
            exact_matches: self.exact_matches,
            near_matches: self.near_matches,
        }
    }
}

/// Game model
#[derive(Debug, Clone)]
pub struct Game {
    pub key: GameKey,
    pub player: PlayerId,
    pub pool: Pool,
    pub code_length: usize,
    pub secret_code: SecretCode,
    pub state: GameState,
    /// Guesses in submission order
    pub guesses: Vec<Guess>,
    pub created_at: DateTime<Utc>,
    pub solved_at: Option<DateTime<Utc>>,
}

impl Game {
    /// Create a new active game with no guesses
    pub fn new(player: PlayerId, pool: Pool, secret_code: SecretCode) -> Self {
        Self {
            key: Uuid::new_v4(),
            player,
            pool,
            code_length: secret_code.len(),
            secret_code,
            state: GameState::Active,
            guesses: Vec::new(),
            created_at: store_now(),
            solved_at: None,
        }
    }

    pub fn is_solved(&self) -> bool {
        self.state.is_solved()
    }

    pub fn guess_count(&self) -> usize {
        self.guesses.len()
    }

    /// Append a scored guess, solving the game if every position matched
    ///
    /// Callers must have checked that the game is still active and that the
    /// score came from this game's secret.
    pub fn record_guess(&mut self, text: String, score: Score) -> Guess {
        let now = store_now();
        let guess = Guess {
            key: Uuid::new_v4(),
            game_key: self.key,
            ordinal: self.guesses.len(),
            text,
            exact_matches: score.exact_matches,
            near_matches: score.near_matches,
            created_at: now,
        };
        if score.exact_matches == self.code_length {
            self.state = GameState::Solved;
            self.solved_at = Some(now);
        }
        self.guesses.push(guess.clone());
        guess
    }

    /// Client-facing view; the secret is included only once solved
    pub fn view(&self) -> GameView {
        GameView {
            key: self.key,
            pool: self.pool.to_string(),
            code_length: self.code_length,
            state: self.state,
            guesses: self.guesses.clone(),
            secret_code: self.is_solved().then(|| self.secret_code.expose()),
            created_at: self.created_at,
            solved_at: self.solved_at,
        }
    }
}

/// Serializable game projection handed to the transport layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub key: GameKey,
    pub pool: String,
    pub code_length: usize,
    pub state: GameState,
    pub guesses: Vec<Guess>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_code: Option<String>,
    pub created_at: DateTime<Utc>,
    pub solved_at: Option<DateTime<Utc>>,
}

/// Current time at the microsecond precision stores keep
fn store_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}
