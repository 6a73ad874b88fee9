//! Terminal codebreaker player.
//!
//! Starts one game through [`GameManager`] and reads guesses from stdin until
//! the code is broken or input ends.

use std::io::Write;
use std::sync::Arc;

use anyhow::Error;
use codebreaker::{
    EngineConfig, GameManager,
    db::DatabaseConfig,
    store::{GameStore, InMemoryGameStore, PgGameStore},
};
use ctrlc::set_handler;
use log::info;
use pico_args::Arguments;
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Play a game of codebreaker in the terminal

USAGE:
  cb_play [OPTIONS]

OPTIONS:
  --pool       SYMBOLS     Symbols the secret is drawn from  [default: 123456]
  --length     N           Secret code length                [default: 4]
  --player     ID          Player id owning the game         [default: 1]
  --db-url     URL         Store games in PostgreSQL at URL  [default: in-memory]

FLAGS:
  --postgres               Store games in PostgreSQL at env DATABASE_URL
  -h, --help               Print help information

ENVIRONMENT:
  DATABASE_URL                          PostgreSQL connection string
  CODEBREAKER_MAX_CODE_LENGTH           Longest accepted code
  CODEBREAKER_MAX_POOL_SIZE             Largest accepted pool
  CODEBREAKER_ACTOR_IDLE_TIMEOUT_SECS   Idle time before a game actor retires
";

struct Args {
    pool: String,
    length: usize,
    player: i64,
    database_url: Option<String>,
    postgres: bool,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let args = Args {
        pool: pargs
            .opt_value_from_str("--pool")?
            .unwrap_or_else(|| "123456".to_string()),
        length: pargs.opt_value_from_str("--length")?.unwrap_or(4),
        player: pargs.opt_value_from_str("--player")?.unwrap_or(1),
        database_url: pargs.opt_value_from_str("--db-url")?,
        postgres: pargs.contains("--postgres"),
    };

    let remaining = pargs.finish();
    if !remaining.is_empty() {
        anyhow::bail!("Unexpected arguments: {remaining:?}");
    }

    set_handler(|| std::process::exit(0))?;

    env_logger::builder().format_target(false).init();

    let config = EngineConfig::from_env()?;
    let store = open_store(&args).await?;
    let manager = GameManager::new(store, config);

    let game = manager
        .start_game(&args.pool, args.length, args.player)
        .await?;
    println!(
        "Pool {} | code length {} | game {}",
        game.pool, game.code_length, game.key
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut submitted = 0;
    prompt(submitted)?;

    while let Some(line) = lines.next_line().await? {
        let text = line.trim();
        if text.is_empty() {
            prompt(submitted)?;
            continue;
        }

        match manager.submit_guess(game.key, text, args.player).await {
            Ok(guess) => {
                println!("  exact {} | near {}", guess.exact_matches, guess.near_matches);
                if guess.score().is_solution(game.code_length) {
                    let solved = manager.get_game(game.key, args.player).await?;
                    let secret = solved.view().secret_code.unwrap_or_default();
                    println!("Solved {} in {} guesses", secret, solved.guess_count());
                    break;
                }
                submitted = guess.ordinal + 1;
                prompt(submitted)?;
            }
            Err(e) if e.is_client_error() => {
                println!("  {}", e.client_message());
                prompt(submitted)?;
            }
            Err(e) => return Err(e.into()),
        }
    }

    manager.shutdown().await;
    Ok(())
}

async fn open_store(args: &Args) -> Result<Arc<dyn GameStore>, Error> {
    if args.database_url.is_none() && !args.postgres {
        info!("Using in-memory game store");
        return Ok(Arc::new(InMemoryGameStore::new()));
    }

    let mut db_config = match &args.database_url {
        Some(url) => DatabaseConfig {
            database_url: url.clone(),
            ..DatabaseConfig::development()
        },
        None => DatabaseConfig::from_env()?,
    };
    db_config.max_connections = db_config.max_connections.min(5);

    let store = PgGameStore::connect(&db_config)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to connect to database: {}", e))?;
    store.health_check().await?;
    store.migrate().await?;
    info!("Using PostgreSQL game store");

    Ok(Arc::new(store))
}

fn prompt(guess_number: usize) -> Result<(), Error> {
    print!("guess {}> ", guess_number + 1);
    std::io::stdout().flush()?;
    Ok(())
}
