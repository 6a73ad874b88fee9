//! Secret code generation.

use super::{
    entities::SecretCode,
    errors::{GameResult, PoolRejection},
    pool::Pool,
};
use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::Mutex;

/// Source of uniform random indices shared by concurrent game creation
pub trait RandomSource: Send + Sync {
    /// Uniform index in `0..bound`; `bound` is never zero
    fn next_index(&self, bound: usize) -> usize;
}

/// Thread-local, OS-seeded CSPRNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&self, bound: usize) -> usize {
        rand::rng().random_range(0..bound)
    }
}

/// Deterministic source for reproducible games
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&self, bound: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        rng.random_range(0..bound)
    }
}

/// Draw a secret code from a validated pool
///
/// # Arguments
///
/// * `pool` - Validated symbol pool
/// * `code_length` - Number of symbols to draw
/// * `rng` - Random source
///
/// # Returns
///
/// * `GameResult<SecretCode>` - Code of `code_length` symbols, repeats allowed
///
/// # Errors
///
/// * `GameError::InvalidPool` - Pool is empty
pub fn generate_secret(
    pool: &Pool,
    code_length: usize,
    rng: &dyn RandomSource,
) -> GameResult<SecretCode> {
    let symbols = pool.symbols();
    if symbols.is_empty() {
        return Err(PoolRejection::Empty.into());
    }

    let code = (0..code_length)
        .map(|_| symbols[rng.next_index(symbols.len())])
        .collect();

    Ok(SecretCode::new(code))
}
