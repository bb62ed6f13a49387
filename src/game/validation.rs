//! Word validation for submitted words
//!
//! Checks in order, stopping at the first failure:
//! 1. Minimum length
//! 2. Not already accepted this session (case-insensitive)
//! 3. Dictionary lookup (common words skip the lookup)

use super::dictionary::{is_common_word, Dictionary};
use std::sync::Arc;
use tracing::{debug, warn};

/// Default minimum word length for valid submissions
pub const MIN_WORD_LENGTH: usize = 2;

/// Why a submitted word was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Word is shorter than the minimum length
    TooShort { min: usize },
    /// Word was already accepted this session
    AlreadyUsed,
    /// Dictionary says no, or could not be asked
    NotAWord,
}

impl Rejection {
    /// Returns a user-friendly error message
    pub fn message(&self) -> String {
        match self {
            Rejection::TooShort { min } => format!("Word must be at least {} letters long", min),
            Rejection::AlreadyUsed => "Word already used".to_string(),
            Rejection::NotAWord => "Not a valid word".to_string(),
        }
    }
}

/// Outcome of validating one word
pub type Verdict = Result<(), Rejection>;

/// Validates words against the session history and a dictionary.
#[derive(Clone)]
pub struct Validator {
    dictionary: Arc<dyn Dictionary>,
    min_length: usize,
}

impl Validator {
    pub fn new(dictionary: Arc<dyn Dictionary>, min_length: usize) -> Self {
        Self {
            dictionary,
            min_length,
        }
    }

    /// Checks that need no I/O: length, then duplicates.
    pub fn check_local<S: AsRef<str>>(&self, word: &str, history: &[S]) -> Verdict {
        if word.chars().count() < self.min_length {
            return Err(Rejection::TooShort {
                min: self.min_length,
            });
        }

        if history.iter().any(|w| w.as_ref().eq_ignore_ascii_case(word)) {
            return Err(Rejection::AlreadyUsed);
        }

        Ok(())
    }

    /// Validate `word` given the words already accepted this session.
    ///
    /// Lookup failures count as "not a word"; they are logged separately
    /// so an unreachable service can be told apart from a bad guess.
    pub async fn validate<S: AsRef<str>>(&self, word: &str, history: &[S]) -> Verdict {
        self.check_local(word, history)?;

        if is_common_word(word) {
            debug!(word, "accepted from common word list");
            return Ok(());
        }

        match self.dictionary.contains(word).await {
            Ok(true) => Ok(()),
            Ok(false) => {
                debug!(word, dictionary = self.dictionary.name(), "word not found");
                Err(Rejection::NotAWord)
            }
            Err(e) => {
                warn!(word, dictionary = self.dictionary.name(), error = %e, "lookup failed");
                Err(Rejection::NotAWord)
            }
        }
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("dictionary", &self.dictionary.name())
            .field("min_length", &self.min_length)
            .finish()
    }
}
