//! Symbol pool validation.
//!
//! A pool is the alphabet a secret code is drawn from. Validation rejects
//! symbols a player could not reasonably type or distinguish, then normalizes
//! the pool to its distinct symbols in code point order, so `"cab"` and
//! `"abcabc"` describe the same game alphabet.

use super::errors::{GameError, GameResult, PoolRejection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use unicode_general_category::{GeneralCategory, get_general_category};

/// Validated, deduplicated and sorted symbol alphabet
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Pool(Vec<char>);

impl Pool {
    /// Validate and normalize a raw pool
    ///
    /// # Arguments
    ///
    /// * `raw` - Symbols in any order, duplicates allowed
    ///
    /// # Returns
    ///
    /// * `GameResult<Pool>` - Distinct symbols sorted by code point
    ///
    /// # Errors
    ///
    /// * `GameError::InvalidPool` - A symbol is whitespace, control or unassigned
    ///
    /// An empty input yields an empty pool; callers that need symbols to draw
    /// from must check [`Pool::is_empty`].
    pub fn validate(raw: &str) -> GameResult<Self> {
        let mut symbols = BTreeSet::new();
        for c in raw.chars() {
            check_symbol(c)?;
            symbols.insert(c);
        }
        Ok(Self(symbols.into_iter().collect()))
    }

    /// Symbols in code point order
    pub fn symbols(&self) -> &[char] {
        &self.0
    }

    /// Number of distinct symbols
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether the symbol belongs to this pool
    pub fn contains(&self, symbol: char) -> bool {
        self.0.binary_search(&symbol).is_ok()
    }
}

/// Validate a raw pool, returning its normalized form
///
/// Shorthand for [`Pool::validate`].
pub fn validate_pool(raw: &str) -> GameResult<Pool> {
    Pool::validate(raw)
}

/// No-break spaces count as symbols, not separators
fn is_separator(c: char) -> bool {
    c.is_whitespace() && !matches!(c, '\u{00A0}' | '\u{2007}' | '\u{202F}')
}

fn check_symbol(c: char) -> Result<(), PoolRejection> {
    if is_separator(c) {
        return Err(PoolRejection::Whitespace(c));
    }
    if c.is_control() {
        return Err(PoolRejection::Control(c));
    }
    if get_general_category(c) == GeneralCategory::Unassigned {
        return Err(PoolRejection::Unassigned(c));
    }
    Ok(())
}

impl std::fmt::Display for Pool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for c in &self.0 {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl From<Pool> for String {
    fn from(pool: Pool) -> Self {
        pool.to_string()
    }
}

impl TryFrom<String> for Pool {
    type Error = GameError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Pool::validate(&raw)
    }
}
