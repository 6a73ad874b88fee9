//! In-memory game store.

use super::repository::{GameStore, StoreError, StoreResult};
use crate::game::{Game, GameKey, Guess, GuessKey, PlayerId};
use async_trait::async_trait;
use std::{collections::HashMap, sync::Arc};
use tokio::sync::RwLock;

/// Game store backed by a shared map, for tests and single-process embedding
#[derive(Clone, Default)]
pub struct InMemoryGameStore {
    games: Arc<RwLock<HashMap<GameKey, Game>>>,
}

impl InMemoryGameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored games
    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }
}

#[async_trait]
impl GameStore for InMemoryGameStore {
    async fn save(&self, game: &Game) -> StoreResult<Game> {
        self.games.write().await.insert(game.key, game.clone());
        Ok(game.clone())
    }

    async fn find_game_by_key_and_player(
        &self,
        key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Game>> {
        let games = self.games.read().await;
        Ok(games.get(&key).filter(|g| g.player == player).cloned())
    }

    async fn find_guess_by_key_and_game_key_and_player(
        &self,
        guess_key: GuessKey,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Guess>> {
        let games = self.games.read().await;
        Ok(games
            .get(&game_key)
            .filter(|g| g.player == player)
            .and_then(|g| g.guesses.iter().find(|guess| guess.key == guess_key))
            .cloned())
    }

    async fn list_guesses_for_game(
        &self,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Vec<Guess>> {
        let games = self.games.read().await;
        Ok(games
            .get(&game_key)
            .filter(|g| g.player == player)
            .map(|g| g.guesses.clone())
            .unwrap_or_default())
    }

    async fn append_guess(&self, game: &Game, guess: &Guess) -> StoreResult<Guess> {
        let mut games = self.games.write().await;
        let stored = games
            .get_mut(&game.key)
            .ok_or(StoreError::UnknownGame(game.key))?;

        if stored.is_solved() {
            return Err(StoreError::GameClosed(game.key));
        }
        if guess.ordinal != stored.guesses.len() {
            return Err(StoreError::Conflict {
                game_key: game.key,
                expected: stored.guesses.len(),
                actual: guess.ordinal,
            });
        }

        stored.guesses.push(guess.clone());
        stored.state = game.state;
        stored.solved_at = game.solved_at;

        Ok(guess.clone())
    }
}
