use async_trait::async_trait;
use game_core::{Dictionary, DictionaryError};
use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

pub const KBBI_BASE_URL: &str = "https://kbbi.kemdikbud.go.id/entri";

/// Text KBBI renders on an entry page when the lemma does not exist.
const NOT_FOUND_MARKER: &str = "Entri tidak ditemukan";

/// Looks lemmas up in the online KBBI (Indonesian) dictionary.
pub struct KbbiDictionary {
    client: Client,
    base_url: String,
}

impl KbbiDictionary {
    pub fn new() -> Self {
        Self::with_base_url(KBBI_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn entry_url(&self, lemma: &str) -> String {
        format!("{}/{}", self.base_url, lemma)
    }
}

impl Default for KbbiDictionary {
    fn default() -> Self {
        Self::new()
    }
}

pub fn page_has_entry(body: &str) -> bool {
    !body.contains(NOT_FOUND_MARKER)
}

#[async_trait]
impl Dictionary for KbbiDictionary {
    async fn lemma_is_valid(&self, lemma: &str) -> Result<bool, DictionaryError> {
        let url = self.entry_url(lemma);
        debug!("Looking up '{}' at {}", lemma, url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            warn!("KBBI request for '{}' failed: {:?}", lemma, e);
            DictionaryError::Request(e.to_string())
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!("KBBI returned status {} for '{}'", status, lemma);
            return Err(DictionaryError::UnexpectedStatus {
                lemma: lemma.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| {
            warn!("Failed to read KBBI page for '{}': {:?}", lemma, e);
            DictionaryError::Request(e.to_string())
        })?;

        Ok(page_has_entry(&body))
    }
}
