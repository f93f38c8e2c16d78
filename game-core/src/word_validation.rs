use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("dictionary answered with status {status} for '{lemma}'")]
    UnexpectedStatus { lemma: String, status: u16 },
    #[error("dictionary request failed: {0}")]
    Request(String),
}

/// Answers whether a lemma is a real word.
#[async_trait]
pub trait Dictionary: Send + Sync {
    async fn lemma_is_valid(&self, lemma: &str) -> Result<bool, DictionaryError>;
}

/// Validators keyed by language code, e.g. `id-id`.
pub type Dictionaries = HashMap<String, Arc<dyn Dictionary>>;

/// In-memory dictionary loaded from a word list.
pub struct WordListDictionary {
    valid_words: HashSet<String>,
}

impl WordListDictionary {
    /// One word per line; blank lines and `#` comments are skipped.
    pub fn new(word_list: &str) -> Self {
        let valid_words = word_list
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_lowercase)
            .collect();

        Self { valid_words }
    }

    pub fn is_valid_word(&self, word: &str) -> bool {
        let word = word.trim().to_lowercase();
        self.valid_words.contains(&word)
    }

    pub fn len(&self) -> usize {
        self.valid_words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.valid_words.is_empty()
    }
}

#[async_trait]
impl Dictionary for WordListDictionary {
    async fn lemma_is_valid(&self, lemma: &str) -> Result<bool, DictionaryError> {
        Ok(is_alphabetic(lemma) && self.is_valid_word(lemma))
    }
}

/// Check if word contains only alphabetic characters
pub fn is_alphabetic(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| c.is_alphabetic())
}

/// Remembers answers of the wrapped dictionary for `ttl`. Failed lookups are
/// not remembered.
pub struct CachedDictionary<D> {
    inner: D,
    ttl: Duration,
    entries: RwLock<HashMap<String, (bool, Instant)>>,
}

impl<D: Dictionary> CachedDictionary<D> {
    pub fn new(inner: D, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn cached_entries(&self) -> usize {
        self.entries.read().await.len()
    }
}

#[async_trait]
impl<D: Dictionary> Dictionary for CachedDictionary<D> {
    async fn lemma_is_valid(&self, lemma: &str) -> Result<bool, DictionaryError> {
        let key = lemma.to_lowercase();

        {
            let entries = self.entries.read().await;
            if let Some((valid, cached_at)) = entries.get(&key) {
                if cached_at.elapsed() < self.ttl {
                    debug!("Dictionary cache hit for '{}'", key);
                    return Ok(*valid);
                }
            }
        }

        let valid = self.inner.lemma_is_valid(&key).await?;

        let mut entries = self.entries.write().await;
        entries.retain(|_, (_, cached_at)| cached_at.elapsed() < self.ttl);
        entries.insert(key, (valid, Instant::now()));

        Ok(valid)
    }
}
