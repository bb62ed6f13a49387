#![allow(dead_code)]
//! Dictionary lookups for word validation
//!
//! The engine only needs to ask "is this a word?". The remote backend
//! queries a free dictionary HTTP service; offline play swaps in a
//! permissive backend. A short allow-list of common words is consulted
//! before any lookup so the easiest words never wait on the network.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Default base URL of the dictionary service (word is appended as a path segment)
pub const DEFAULT_DICTIONARY_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";

/// Default per-lookup timeout
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Common three-letter words accepted without a lookup
static COMMON_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["CAT", "DOG", "BAT", "RAT", "HAT", "MAT", "SIT", "RUN", "BIG", "RED"]
        .into_iter()
        .collect()
});

/// Failure to reach a verdict for a word.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Request could not be sent or the connection failed
    #[error("dictionary unreachable: {0}")]
    Transport(String),

    /// Service answered with an unexpected status
    #[error("dictionary returned status {0}")]
    Status(u16),

    /// Response body was not the expected JSON shape
    #[error("malformed dictionary response: {0}")]
    Malformed(String),
}

/// Answers whether a word exists.
#[async_trait]
pub trait Dictionary: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Look up `word` (any case).
    async fn contains(&self, word: &str) -> Result<bool, LookupError>;
}

/// Check the built-in common word list (case-insensitive, three letters only).
pub fn is_common_word(word: &str) -> bool {
    word.len() == 3 && COMMON_WORDS.contains(word.to_uppercase().as_str())
}

/// Dictionary backed by an HTTP service returning a JSON array of entries.
pub struct RemoteDictionary {
    client: reqwest::Client,
    base_url: String,
}

impl RemoteDictionary {
    /// Create a client for the given base URL
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("wordrush/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// URL queried for `word`
    pub fn entry_url(&self, word: &str) -> String {
        format!("{}/{}", self.base_url, word.to_lowercase())
    }
}

#[async_trait]
impl Dictionary for RemoteDictionary {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn contains(&self, word: &str) -> Result<bool, LookupError> {
        let url = self.entry_url(word);
        debug!(%url, "dictionary lookup");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(false);
        }
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;
        parse_entries(&body)
    }
}

/// Interpret a dictionary response body: a non-empty JSON array means the word exists.
pub fn parse_entries(body: &str) -> Result<bool, LookupError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    match value {
        serde_json::Value::Array(entries) => Ok(!entries.is_empty()),
        // The service answers unknown words with an object ({"title": "No Definitions Found", ...})
        serde_json::Value::Object(_) => Ok(false),
        other => Err(LookupError::Malformed(format!("unexpected JSON: {}", other))),
    }
}

/// Accepts every word. Used for offline play.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnyWord;

#[async_trait]
impl Dictionary for AnyWord {
    fn name(&self) -> &'static str {
        "offline"
    }

    async fn contains(&self, _word: &str) -> Result<bool, LookupError> {
        Ok(true)
    }
}

/// Only the built-in common words.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommonWords;

#[async_trait]
impl Dictionary for CommonWords {
    fn name(&self) -> &'static str {
        "common"
    }

    async fn contains(&self, word: &str) -> Result<bool, LookupError> {
        Ok(is_common_word(word))
    }
}

/// Config-facing selector for the dictionary backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionaryKind {
    /// Ask the HTTP dictionary service
    #[default]
    Remote,
    /// Only the built-in common words
    Common,
    /// Accept every word
    Offline,
}

impl DictionaryKind {
    /// Build the backend. `base_url` and `timeout` only matter for `Remote`.
    pub fn build(
        self,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Arc<dyn Dictionary>, LookupError> {
        Ok(match self {
            DictionaryKind::Remote => Arc::new(RemoteDictionary::new(base_url, timeout)?),
            DictionaryKind::Common => Arc::new(CommonWords),
            DictionaryKind::Offline => Arc::new(AnyWord),
        })
    }
}
