//! Guess scoring.
//!
//! Classic Mastermind scoring: exact matches are counted first, then each
//! remaining guess symbol can claim at most one remaining secret symbol of the
//! same value.

use super::errors::{GameError, GameResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Exact and near match counts for a guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Score {
    /// Right symbol, right position
    pub exact_matches: usize,
    /// Right symbol, wrong position
    pub near_matches: usize,
}

impl Score {
    /// Whether this score solves a code of `code_length` symbols
    pub fn is_solution(&self, code_length: usize) -> bool {
        self.exact_matches == code_length
    }
}

/// Score a guess against a secret
///
/// # Arguments
///
/// * `secret` - Secret code symbols
/// * `guess` - Guess symbols
///
/// # Returns
///
/// * `GameResult<Score>` - Exact and near match counts
///
/// # Errors
///
/// * `GameError::InvalidGuessLength` - Guess and secret lengths differ
pub fn evaluate(secret: &[char], guess: &[char]) -> GameResult<Score> {
    if secret.len() != guess.len() {
        return Err(GameError::InvalidGuessLength {
            expected: secret.len(),
            actual: guess.len(),
        });
    }

    let mut exact_matches = 0;
    let mut secret_remaining: HashMap<char, usize> = HashMap::new();
    let mut guess_remaining: HashMap<char, usize> = HashMap::new();

    for (&s, &g) in secret.iter().zip(guess) {
        if s == g {
            exact_matches += 1;
        } else {
            *secret_remaining.entry(s).or_default() += 1;
            *guess_remaining.entry(g).or_default() += 1;
        }
    }

    let near_matches = guess_remaining
        .iter()
        .map(|(symbol, &count)| count.min(secret_remaining.get(symbol).copied().unwrap_or(0)))
        .sum();

    Ok(Score {
        exact_matches,
        near_matches,
    })
}
