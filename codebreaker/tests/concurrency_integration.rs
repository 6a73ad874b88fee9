//! Concurrency tests for per-game guess serialization.
//!
//! Verifies that concurrent submissions to one game are appended exactly once
//! each, in a single total order, that only one winning guess is ever accepted,
//! and that idle actors retire without losing work.

use async_trait::async_trait;
use codebreaker::{
    EngineConfig, GameError, GameManager, GameState,
    game::{Game, GameKey, Guess, GuessKey, PlayerId},
    store::{GameStore, InMemoryGameStore, StoreResult},
};
use std::{
    collections::HashSet,
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

const PLAYER: i64 = 7;

/// Store wrapper recording the peak number of overlapping appends
struct OverlapTrackingStore {
    inner: InMemoryGameStore,
    append_delay: Duration,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl OverlapTrackingStore {
    fn with_append_delay(append_delay: Duration) -> Self {
        Self {
            inner: InMemoryGameStore::new(),
            append_delay,
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl GameStore for OverlapTrackingStore {
    async fn save(&self, game: &Game) -> StoreResult<Game> {
        self.inner.save(game).await
    }

    async fn find_game_by_key_and_player(
        &self,
        key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Game>> {
        self.inner.find_game_by_key_and_player(key, player).await
    }

    async fn find_guess_by_key_and_game_key_and_player(
        &self,
        guess_key: GuessKey,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Guess>> {
        self.inner
            .find_guess_by_key_and_game_key_and_player(guess_key, game_key, player)
            .await
    }

    async fn list_guesses_for_game(
        &self,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Vec<Guess>> {
        self.inner.list_guesses_for_game(game_key, player).await
    }

    async fn append_guess(&self, game: &Game, guess: &Guess) -> StoreResult<Guess> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.append_delay).await;
        let result = self.inner.append_guess(game, guess).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

fn setup_manager(store: Arc<dyn GameStore>, idle_secs: u64) -> Arc<GameManager> {
    Arc::new(GameManager::new(
        store,
        EngineConfig {
            actor_idle_timeout_secs: idle_secs,
            ..EngineConfig::default()
        },
    ))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_guesses_all_recorded_in_order() {
    let store = Arc::new(OverlapTrackingStore::with_append_delay(Duration::from_millis(1)));
    let manager = setup_manager(store.clone(), 60);
    let game = manager.start_game("0123456789", 4, PLAYER).await.unwrap();
    let key = game.key;

    const N: usize = 50;
    let mut tasks = Vec::new();
    for i in 0..N {
        let manager = manager.clone();
        // '#' is outside the pool, so none of these can solve the game
        let text = format!("#{:03}", i);
        tasks.push(tokio::spawn(async move {
            manager.submit_guess(key, &text, PLAYER).await
        }));
    }

    let mut submitted = Vec::new();
    for task in tasks {
        submitted.push(task.await.unwrap().expect("Submission should succeed"));
    }

    let ordinals: HashSet<usize> = submitted.iter().map(|g| g.ordinal).collect();
    assert_eq!(ordinals, (0..N).collect::<HashSet<_>>(), "Ordinals must be dense and unique");

    let stored = manager.list_guesses(game.key, PLAYER).await.unwrap();
    assert_eq!(stored.len(), N);
    for (i, guess) in stored.iter().enumerate() {
        assert_eq!(guess.ordinal, i);
        let original = submitted.iter().find(|g| g.key == guess.key).unwrap();
        assert_eq!(original, guess);
    }

    assert_eq!(
        store.peak.load(Ordering::SeqCst),
        1,
        "Appends to one game must never overlap"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_winning_guesses_solve_once() {
    let manager = setup_manager(Arc::new(InMemoryGameStore::new()), 60);
    // Single-symbol pool: the secret is known to be "AAA"
    let game = manager.start_game("A", 3, PLAYER).await.unwrap();
    let key = game.key;

    let mut tasks = Vec::new();
    for _ in 0..20 {
        let manager = manager.clone();
        tasks.push(tokio::spawn(async move {
            manager.submit_guess(key, "AAA", PLAYER).await
        }));
    }

    let mut winners = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.unwrap() {
            Ok(guess) => {
                assert_eq!(guess.exact_matches, 3);
                assert_eq!(guess.ordinal, 0);
                winners += 1;
            }
            Err(GameError::GameAlreadySolved) => rejected += 1,
            Err(other) => panic!("Unexpected error: {other}"),
        }
    }

    assert_eq!(winners, 1);
    assert_eq!(rejected, 19);

    let game = manager.get_game(key, PLAYER).await.unwrap();
    assert_eq!(game.state, GameState::Solved);
    assert_eq!(game.guess_count(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_games_progress_in_parallel() {
    let manager = setup_manager(Arc::new(InMemoryGameStore::new()), 60);

    let mut games = Vec::new();
    for _ in 0..8 {
        games.push(manager.start_game("ABCDEF", 4, PLAYER).await.unwrap());
    }

    let mut tasks = Vec::new();
    for game in &games {
        for _ in 0..10 {
            let manager = manager.clone();
            let key = game.key;
            tasks.push(tokio::spawn(async move {
                manager.submit_guess(key, "####", PLAYER).await
            }));
        }
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    assert_eq!(manager.active_actor_count().await, games.len());
    for game in &games {
        let guesses = manager.list_guesses(game.key, PLAYER).await.unwrap();
        assert_eq!(guesses.len(), 10);
    }
}

#[tokio::test]
async fn test_idle_actor_retires_and_respawns() {
    let manager = setup_manager(Arc::new(InMemoryGameStore::new()), 0);
    let game = manager.start_game("ABCDEF", 4, PLAYER).await.unwrap();

    let first = manager.submit_guess(game.key, "####", PLAYER).await.unwrap();
    assert_eq!(first.ordinal, 0);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(manager.active_actor_count().await, 0, "Idle actor should retire");

    let second = manager.submit_guess(game.key, "####", PLAYER).await.unwrap();
    assert_eq!(second.ordinal, 1, "Respawned actor continues from stored state");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_no_submission_lost_while_actors_churn() {
    // Zero idle timeout makes actors retire between almost every message
    let manager = setup_manager(Arc::new(InMemoryGameStore::new()), 0);
    let game = manager.start_game("ABCDEF", 4, PLAYER).await.unwrap();
    let key = game.key;

    let mut tasks = Vec::new();
    for _ in 0..4 {
        let manager = manager.clone();
        tasks.push(tokio::spawn(async move {
            for _ in 0..5 {
                manager.submit_guess(key, "####", PLAYER).await?;
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
            Ok::<_, GameError>(())
        }));
    }
    for task in tasks {
        task.await.unwrap().unwrap();
    }

    let guesses = manager.list_guesses(game.key, PLAYER).await.unwrap();
    assert_eq!(guesses.len(), 20);
    for (i, guess) in guesses.iter().enumerate() {
        assert_eq!(guess.ordinal, i);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_shutdown_never_runs_two_actors_for_one_game() {
    let store = Arc::new(OverlapTrackingStore::with_append_delay(Duration::from_millis(20)));
    let manager = setup_manager(store.clone(), 60);
    let game = manager.start_game("0123456789", 4, PLAYER).await.unwrap();
    let key = game.key;

    let mut tasks = Vec::new();
    for i in 0..5 {
        let manager = manager.clone();
        let text = format!("#{:03}", i);
        tasks.push(tokio::spawn(async move {
            manager.submit_guess(key, &text, PLAYER).await
        }));
    }

    // Let the actor start on the queued guesses before stopping it
    tokio::time::sleep(Duration::from_millis(5)).await;
    let stopping = {
        let manager = manager.clone();
        tokio::spawn(async move { manager.shutdown().await })
    };
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Arrives while the old actor is still draining its inbox
    let late = manager.submit_guess(key, "#999", PLAYER).await;
    stopping.await.unwrap();

    let mut errors = Vec::new();
    for task in tasks {
        if let Err(e) = task.await.unwrap() {
            errors.push(e.to_string());
        }
    }
    if let Err(e) = late {
        errors.push(e.to_string());
    }
    assert!(errors.is_empty(), "Every submission should succeed: {errors:?}");

    assert_eq!(
        store.peak.load(Ordering::SeqCst),
        1,
        "A stopping actor and its replacement must never append together"
    );

    let guesses = manager.list_guesses(key, PLAYER).await.unwrap();
    assert_eq!(guesses.len(), 6);
    for (i, guess) in guesses.iter().enumerate() {
        assert_eq!(guess.ordinal, i);
    }
}
