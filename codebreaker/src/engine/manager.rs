//! Game manager: the engine's public entry point.

use super::{
    actor::{ActorRegistry, GameActor, GameHandle},
    messages::GameMessage,
};
use crate::{
    config::EngineConfig,
    game::{
        Game, GameError, GameKey, GameResult, Guess, GuessKey, PlayerId, Pool, PoolRejection,
        RandomSource, ThreadRandom, generate_secret,
    },
    store::GameStore,
};
use std::{collections::HashMap, sync::Arc};
use tokio::sync::{RwLock, oneshot};

/// Attempts to reach a live actor before giving up on a submission
const MAX_DISPATCH_ATTEMPTS: usize = 8;

/// Game lifecycle manager
///
/// Reads go straight to the store. Guess submissions are routed through a
/// per-game [`GameActor`], so scoring, appending and the win check for a
/// game never interleave, while different games proceed in parallel.
pub struct GameManager {
    /// Game persistence
    store: Arc<dyn GameStore>,

    /// Randomness for secret codes
    rng: Arc<dyn RandomSource>,

    /// Engine limits and actor tuning
    config: EngineConfig,

    /// Live game actors
    actors: ActorRegistry,
}

impl GameManager {
    /// Create a new game manager using the thread-local CSPRNG
    ///
    /// # Arguments
    ///
    /// * `store` - Game store
    /// * `config` - Engine configuration
    pub fn new(store: Arc<dyn GameStore>, config: EngineConfig) -> Self {
        Self::with_random_source(store, Arc::new(ThreadRandom), config)
    }

    /// Create a new game manager with an explicit random source
    pub fn with_random_source(
        store: Arc<dyn GameStore>,
        rng: Arc<dyn RandomSource>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            rng,
            config,
            actors: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new game
    ///
    /// # Arguments
    ///
    /// * `pool` - Raw symbol pool
    /// * `code_length` - Secret code length
    /// * `player` - Owning player
    ///
    /// # Returns
    ///
    /// * `GameResult<Game>` - Stored game, active with no guesses
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidCodeLength` - Code length is zero or above the limit
    /// * `GameError::InvalidPool` - Pool has forbidden symbols, is empty, or is too large
    /// * `GameError::Store` - Persisting the game failed
    pub async fn start_game(
        &self,
        pool: &str,
        code_length: usize,
        player: PlayerId,
    ) -> GameResult<Game> {
        if code_length == 0 || code_length > self.config.max_code_length {
            return Err(GameError::InvalidCodeLength {
                requested: code_length,
                max: self.config.max_code_length,
            });
        }

        let pool = Pool::validate(pool)?;
        if pool.len() > self.config.max_pool_size {
            return Err(PoolRejection::TooLarge {
                size: pool.len(),
                max: self.config.max_pool_size,
            }
            .into());
        }

        let secret = generate_secret(&pool, code_length, self.rng.as_ref())?;
        let game = self.store.save(&Game::new(player, pool, secret)).await?;

        log::info!(
            "Started game {} for player {} (code length {}, pool size {})",
            game.key,
            player,
            game.code_length,
            game.pool.len()
        );

        Ok(game)
    }

    /// Get a game owned by `player`
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - No such game, or it belongs to someone else
    pub async fn get_game(&self, game_key: GameKey, player: PlayerId) -> GameResult<Game> {
        self.store
            .find_game_by_key_and_player(game_key, player)
            .await?
            .ok_or(GameError::NotFound)
    }

    /// Submit a guess
    ///
    /// # Arguments
    ///
    /// * `game_key` - Game to guess in
    /// * `text` - Guess symbols
    /// * `player` - Submitting player
    ///
    /// # Returns
    ///
    /// * `GameResult<Guess>` - Scored, stored guess
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - No such game for this player
    /// * `GameError::GameAlreadySolved` - Game accepts no more guesses
    /// * `GameError::InvalidGuessLength` - Guess length differs from code length
    /// * `GameError::Store` - Persisting the guess failed
    /// * `GameError::EngineUnavailable` - No actor could take the submission
    pub async fn submit_guess(
        &self,
        game_key: GameKey,
        text: &str,
        player: PlayerId,
    ) -> GameResult<Guess> {
        for attempt in 1..=MAX_DISPATCH_ATTEMPTS {
            let (tx, rx) = oneshot::channel();
            let message = GameMessage::SubmitGuess {
                player,
                text: text.to_string(),
                response: tx,
            };

            if self.dispatch(game_key, player, message).await?
                && let Ok(result) = rx.await
            {
                return result;
            }

            // Actor retired before taking the message; it was never processed
            log::debug!(
                "Game {}: actor gone, redispatching (attempt {})",
                game_key,
                attempt
            );
        }

        log::warn!(
            "Game {}: no actor accepted submission after {} attempts",
            game_key,
            MAX_DISPATCH_ATTEMPTS
        );
        Err(GameError::EngineUnavailable)
    }

    /// Get a guess belonging to a game owned by `player`
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - Guess, game or ownership does not line up
    pub async fn get_guess(
        &self,
        game_key: GameKey,
        guess_key: GuessKey,
        player: PlayerId,
    ) -> GameResult<Guess> {
        self.store
            .find_guess_by_key_and_game_key_and_player(guess_key, game_key, player)
            .await?
            .ok_or(GameError::NotFound)
    }

    /// List a game's guesses in submission order
    ///
    /// # Errors
    ///
    /// * `GameError::NotFound` - No such game for this player
    pub async fn list_guesses(&self, game_key: GameKey, player: PlayerId) -> GameResult<Vec<Guess>> {
        let guesses = self.store.list_guesses_for_game(game_key, player).await?;
        if guesses.is_empty() {
            // Empty is ambiguous: fresh game, or not this player's game
            self.get_game(game_key, player).await?;
        }
        Ok(guesses)
    }

    /// Number of game actors currently alive
    pub async fn active_actor_count(&self) -> usize {
        self.actors.read().await.len()
    }

    /// Stop every game actor
    ///
    /// Each actor finishes the submissions queued ahead of the stop request
    /// and removes itself from the registry on exit, so a key never has two
    /// live actors. Returns once every actor has exited. Later submissions
    /// spawn fresh actors on demand.
    pub async fn shutdown(&self) {
        let handles: Vec<GameHandle> = self.actors.read().await.values().cloned().collect();

        for handle in &handles {
            if handle.send(GameMessage::Shutdown).await.is_err() {
                log::debug!("Game actor {} already stopped", handle.game_key());
            }
        }
        for handle in &handles {
            handle.closed().await;
        }

        log::info!("Stopped {} game actors", handles.len());
    }

    /// Queue a message on the game's actor, spawning one if needed
    ///
    /// Spawning is preceded by an ownership check so unknown keys never get
    /// an actor, and a fresh actor has the message queued before it starts.
    ///
    /// # Returns
    ///
    /// * `GameResult<bool>` - `false` if the actor closed before accepting the message
    async fn dispatch(
        &self,
        game_key: GameKey,
        player: PlayerId,
        message: GameMessage,
    ) -> GameResult<bool> {
        if let Some(handle) = self.live_handle(game_key).await {
            return Ok(self.send_or_forget(&handle, message).await);
        }

        self.get_game(game_key, player).await?;

        let mut actors = self.actors.write().await;
        if let Some(handle) = actors.get(&game_key).filter(|h| !h.is_closed()).cloned() {
            drop(actors);
            return Ok(self.send_or_forget(&handle, message).await);
        }

        let (actor, handle) = GameActor::new(
            game_key,
            self.store.clone(),
            self.actors.clone(),
            &self.config,
        );
        handle.try_send(message)?;
        actors.insert(game_key, handle);
        drop(actors);

        tokio::spawn(async move {
            actor.run().await;
        });

        Ok(true)
    }

    async fn live_handle(&self, game_key: GameKey) -> Option<GameHandle> {
        let actors = self.actors.read().await;
        actors.get(&game_key).filter(|h| !h.is_closed()).cloned()
    }

    async fn send_or_forget(&self, handle: &GameHandle, message: GameMessage) -> bool {
        if handle.send(message).await.is_ok() {
            return true;
        }
        self.forget(handle).await;
        false
    }

    /// Drop a registry entry if it still points at `handle`
    async fn forget(&self, handle: &GameHandle) {
        let mut actors = self.actors.write().await;
        if actors
            .get(&handle.game_key())
            .is_some_and(|h| h.same_actor(handle))
        {
            actors.remove(&handle.game_key());
        }
    }
}
