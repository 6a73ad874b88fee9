//! Game actor implementation with async message handling.

use super::messages::GameMessage;
use crate::{
    config::EngineConfig,
    game::{GameError, GameKey, GameResult, Guess, PlayerId, evaluate},
    store::{GameStore, StoreError},
};
use std::{collections::HashMap, sync::Arc};
use tokio::{
    sync::{RwLock, mpsc},
    time::{Duration, timeout},
};

/// Live actor handles keyed by game
pub(crate) type ActorRegistry = Arc<RwLock<HashMap<GameKey, GameHandle>>>;

/// Game actor handle for sending messages
#[derive(Clone, Debug)]
pub struct GameHandle {
    sender: mpsc::Sender<GameMessage>,
    game_key: GameKey,
}

impl GameHandle {
    /// Create a new game handle
    pub fn new(sender: mpsc::Sender<GameMessage>, game_key: GameKey) -> Self {
        Self { sender, game_key }
    }

    /// Get game key
    pub fn game_key(&self) -> GameKey {
        self.game_key
    }

    /// Whether the actor behind this handle has stopped
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Whether both handles reach the same actor
    pub fn same_actor(&self, other: &GameHandle) -> bool {
        self.sender.same_channel(&other.sender)
    }

    /// Wait until the actor behind this handle has stopped taking messages
    pub async fn closed(&self) {
        self.sender.closed().await;
    }

    /// Send a message to the game
    pub async fn send(&self, message: GameMessage) -> GameResult<()> {
        self.sender
            .send(message)
            .await
            .map_err(|_| GameError::EngineUnavailable)
    }

    /// Queue a message without waiting for inbox capacity
    pub fn try_send(&self, message: GameMessage) -> GameResult<()> {
        self.sender
            .try_send(message)
            .map_err(|_| GameError::EngineUnavailable)
    }
}

/// Single writer for one game: every guess for the game is scored and
/// appended here, one at a time, in inbox order.
pub struct GameActor {
    /// Game key
    game_key: GameKey,

    /// Game persistence
    store: Arc<dyn GameStore>,

    /// Message inbox
    inbox: mpsc::Receiver<GameMessage>,

    /// Own handle, used to deregister on retirement
    handle: GameHandle,

    /// Registry this actor is listed in
    registry: ActorRegistry,

    /// How long to wait for a message before retiring
    idle_timeout: Duration,
}

impl GameActor {
    /// Create a new game actor
    ///
    /// # Arguments
    ///
    /// * `game_key` - Game this actor serializes
    /// * `store` - Game store
    /// * `registry` - Registry the caller will insert the returned handle into
    /// * `config` - Engine configuration
    ///
    /// # Returns
    ///
    /// * `(GameActor, GameHandle)` - Actor and handle for sending messages
    pub(crate) fn new(
        game_key: GameKey,
        store: Arc<dyn GameStore>,
        registry: ActorRegistry,
        config: &EngineConfig,
    ) -> (Self, GameHandle) {
        let (sender, inbox) = mpsc::channel(config.actor_inbox_capacity);
        let handle = GameHandle::new(sender, game_key);

        let actor = Self {
            game_key,
            store,
            inbox,
            handle: handle.clone(),
            registry,
            idle_timeout: config.actor_idle_timeout(),
        };

        (actor, handle)
    }

    /// Run the game actor event loop
    pub async fn run(mut self) {
        log::debug!("Game actor {} starting", self.game_key);

        loop {
            match timeout(self.idle_timeout, self.inbox.recv()).await {
                Ok(Some(GameMessage::SubmitGuess {
                    player,
                    text,
                    response,
                })) => {
                    let result = self.handle_submit(player, text).await;
                    let _ = response.send(result);
                }
                Ok(Some(GameMessage::Shutdown)) | Ok(None) => {
                    self.deregister().await;
                    break;
                }
                Err(_) => {
                    if self.try_retire().await {
                        break;
                    }
                }
            }
        }

        log::debug!("Game actor {} stopped", self.game_key);
    }

    /// Score and append one guess
    async fn handle_submit(&self, player: PlayerId, text: String) -> GameResult<Guess> {
        let mut game = self
            .store
            .find_game_by_key_and_player(self.game_key, player)
            .await?
            .ok_or(GameError::NotFound)?;

        if game.is_solved() {
            log::debug!("Game {}: rejected guess after solve", self.game_key);
            return Err(GameError::GameAlreadySolved);
        }

        let symbols: Vec<char> = text.chars().collect();
        if symbols.len() != game.code_length {
            log::debug!(
                "Game {}: rejected guess of length {} (code length {})",
                self.game_key,
                symbols.len(),
                game.code_length
            );
            return Err(GameError::InvalidGuessLength {
                expected: game.code_length,
                actual: symbols.len(),
            });
        }

        let score = evaluate(game.secret_code.symbols(), &symbols)?;
        let guess = game.record_guess(text, score);
        let stored = self
            .store
            .append_guess(&game, &guess)
            .await
            .map_err(|e| match e {
                // Solved concurrently by a writer outside this process
                StoreError::GameClosed(_) => GameError::GameAlreadySolved,
                other => other.into(),
            })?;

        if game.is_solved() {
            log::info!(
                "Game {} solved by player {} in {} guesses",
                self.game_key,
                player,
                game.guess_count()
            );
        }

        Ok(stored)
    }

    /// Leave the registry if no work is pending
    ///
    /// The registry write lock excludes concurrent spawns for this key while
    /// the inbox is checked and closed. Anything that slips into the inbox
    /// after the check is dropped with the receiver, and its sender retries.
    async fn try_retire(&mut self) -> bool {
        let mut registry = self.registry.write().await;
        if !self.inbox.is_empty() {
            return false;
        }

        if registry
            .get(&self.game_key)
            .is_some_and(|h| h.same_actor(&self.handle))
        {
            registry.remove(&self.game_key);
        }
        self.inbox.close();

        log::debug!("Game actor {} retiring after idle timeout", self.game_key);
        true
    }

    async fn deregister(&mut self) {
        let mut registry = self.registry.write().await;
        if registry
            .get(&self.game_key)
            .is_some_and(|h| h.same_actor(&self.handle))
        {
            registry.remove(&self.game_key);
        }
        self.inbox.close();
    }
}
