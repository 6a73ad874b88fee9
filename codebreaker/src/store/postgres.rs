//! PostgreSQL implementation of [`GameStore`].
#![allow(clippy::needless_raw_string_hashes)]

use super::repository::{GameStore, StoreError, StoreResult};
use crate::{
    db::DatabaseConfig,
    game::{Game, GameKey, GameState, Guess, GuessKey, PlayerId, Pool, SecretCode},
};
use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres, Row, Transaction,
    postgres::{PgPoolOptions, PgRow},
};
use std::time::Duration;

/// Game store over the `games` and `guesses` tables
#[derive(Clone)]
pub struct PgGameStore {
    pool: PgPool,
}

impl PgGameStore {
    /// Wrap an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool and wrap it
    ///
    /// # Arguments
    ///
    /// * `config` - Connection string and pool sizing
    ///
    /// # Returns
    ///
    /// * `StoreResult<PgGameStore>` - Store over a live pool
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use codebreaker::{db::DatabaseConfig, store::PgGameStore};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let store = PgGameStore::connect(&DatabaseConfig::from_env()?).await?;
    ///     store.migrate().await?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn connect(config: &DatabaseConfig) -> StoreResult<Self> {
        let pool = pool_options(config).connect(&config.database_url).await?;

        log::info!(
            "Connected game store pool (max {} connections)",
            config.max_connections
        );

        Ok(Self::new(pool))
    }

    /// Underlying connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check that the database answers
    pub async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Apply the bundled schema
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::raw_sql(include_str!("../../migrations/001_initial_schema.sql"))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_guess(
        tx: &mut Transaction<'_, Postgres>,
        guess: &Guess,
    ) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO guesses (
                external_key, game_key, ordinal, guess_text, exact_matches, near_matches, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(guess.key)
        .bind(guess.game_key)
        .bind(to_i32(guess.ordinal, "ordinal")?)
        .bind(&guess.text)
        .bind(to_i32(guess.exact_matches, "exact_matches")?)
        .bind(to_i32(guess.near_matches, "near_matches")?)
        .bind(guess.created_at.naive_utc())
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn load_guesses(&self, game_key: GameKey) -> StoreResult<Vec<Guess>> {
        let rows = sqlx::query(
            r#"
            SELECT external_key, game_key, ordinal, guess_text, exact_matches, near_matches, created_at
            FROM guesses
            WHERE game_key = $1
            ORDER BY ordinal ASC
            "#,
        )
        .bind(game_key)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(guess_from_row).collect()
    }
}

#[async_trait]
impl GameStore for PgGameStore {
    async fn save(&self, game: &Game) -> StoreResult<Game> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO games (
                external_key, player, pool, code_length, secret_code, state, created_at, solved_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(game.key)
        .bind(game.player)
        .bind(game.pool.to_string())
        .bind(to_i32(game.code_length, "code_length")?)
        .bind(game.secret_code.expose())
        .bind(game.state.to_string())
        .bind(game.created_at.naive_utc())
        .bind(game.solved_at.map(|dt| dt.naive_utc()))
        .execute(&mut *tx)
        .await?;

        for guess in &game.guesses {
            Self::insert_guess(&mut tx, guess).await?;
        }

        tx.commit().await?;

        Ok(game.clone())
    }

    async fn find_game_by_key_and_player(
        &self,
        key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Game>> {
        let row = sqlx::query(
            r#"
            SELECT external_key, player, pool, code_length, secret_code, state, created_at, solved_at
            FROM games
            WHERE external_key = $1 AND player = $2
            "#,
        )
        .bind(key)
        .bind(player)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let guesses = self.load_guesses(key).await?;
        game_from_row(&row, guesses).map(Some)
    }

    async fn find_guess_by_key_and_game_key_and_player(
        &self,
        guess_key: GuessKey,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Option<Guess>> {
        let row = sqlx::query(
            r#"
            SELECT g.external_key, g.game_key, g.ordinal, g.guess_text,
                   g.exact_matches, g.near_matches, g.created_at
            FROM guesses g
            JOIN games ga ON ga.external_key = g.game_key
            WHERE g.external_key = $1 AND g.game_key = $2 AND ga.player = $3
            "#,
        )
        .bind(guess_key)
        .bind(game_key)
        .bind(player)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(guess_from_row).transpose()
    }

    async fn list_guesses_for_game(
        &self,
        game_key: GameKey,
        player: PlayerId,
    ) -> StoreResult<Vec<Guess>> {
        let rows = sqlx::query(
            r#"
            SELECT g.external_key, g.game_key, g.ordinal, g.guess_text,
                   g.exact_matches, g.near_matches, g.created_at
            FROM guesses g
            JOIN games ga ON ga.external_key = g.game_key
            WHERE g.game_key = $1 AND ga.player = $2
            ORDER BY g.ordinal ASC
            "#,
        )
        .bind(game_key)
        .bind(player)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(guess_from_row).collect()
    }

    async fn append_guess(&self, game: &Game, guess: &Guess) -> StoreResult<Guess> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes appends from every process sharing this database
        let state_row = sqlx::query("SELECT state FROM games WHERE external_key = $1 FOR UPDATE")
            .bind(game.key)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(StoreError::UnknownGame(game.key))?;

        let stored_state = parse_state(&state_row.try_get::<String, _>("state")?)?;
        if stored_state.is_solved() {
            return Err(StoreError::GameClosed(game.key));
        }

        let count: i64 = sqlx::query("SELECT COUNT(*) AS guess_count FROM guesses WHERE game_key = $1")
            .bind(game.key)
            .fetch_one(&mut *tx)
            .await?
            .try_get("guess_count")?;
        let expected = usize::try_from(count)
            .map_err(|_| StoreError::CorruptRecord(format!("negative guess count {count}")))?;
        if guess.ordinal != expected {
            return Err(StoreError::Conflict {
                game_key: game.key,
                expected,
                actual: guess.ordinal,
            });
        }

        Self::insert_guess(&mut tx, guess).await?;

        sqlx::query("UPDATE games SET state = $1, solved_at = $2 WHERE external_key = $3")
            .bind(game.state.to_string())
            .bind(game.solved_at.map(|dt| dt.naive_utc()))
            .bind(game.key)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(guess.clone())
    }
}

fn pool_options(config: &DatabaseConfig) -> PgPoolOptions {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connection_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
}

fn to_i32(value: usize, column: &str) -> StoreResult<i32> {
    i32::try_from(value)
        .map_err(|_| StoreError::CorruptRecord(format!("{column} {value} out of range")))
}

fn to_usize(value: i32, column: &str) -> StoreResult<usize> {
    usize::try_from(value)
        .map_err(|_| StoreError::CorruptRecord(format!("{column} {value} out of range")))
}

fn parse_state(raw: &str) -> StoreResult<GameState> {
    raw.parse().map_err(StoreError::CorruptRecord)
}

fn game_from_row(row: &PgRow, guesses: Vec<Guess>) -> StoreResult<Game> {
    let raw_pool: String = row.try_get("pool")?;
    let pool = Pool::validate(&raw_pool)
        .map_err(|e| StoreError::CorruptRecord(format!("stored pool rejected: {e}")))?;
    let secret_code: String = row.try_get("secret_code")?;

    Ok(Game {
        key: row.try_get("external_key")?,
        player: row.try_get("player")?,
        pool,
        code_length: to_usize(row.try_get("code_length")?, "code_length")?,
        secret_code: SecretCode::from(secret_code.as_str()),
        state: parse_state(&row.try_get::<String, _>("state")?)?,
        guesses,
        created_at: row
            .try_get::<chrono::NaiveDateTime, _>("created_at")?
            .and_utc(),
        solved_at: row
            .try_get::<Option<chrono::NaiveDateTime>, _>("solved_at")?
            .map(|dt| dt.and_utc()),
    })
}

fn guess_from_row(row: &PgRow) -> StoreResult<Guess> {
    Ok(Guess {
        key: row.try_get("external_key")?,
        game_key: row.try_get("game_key")?,
        ordinal: to_usize(row.try_get("ordinal")?, "ordinal")?,
        text: row.try_get("guess_text")?,
        exact_matches: to_usize(row.try_get("exact_matches")?, "exact_matches")?,
        near_matches: to_usize(row.try_get("near_matches")?, "near_matches")?,
        created_at: row
            .try_get::<chrono::NaiveDateTime, _>("created_at")?
            .and_utc(),
    })
}
