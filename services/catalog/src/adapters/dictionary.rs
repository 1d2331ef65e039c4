//! services/catalog/src/adapters/dictionary.rs
//!
//! This module contains the adapter for the public Free Dictionary API.
//! It implements the `DictionaryService` port from the `core` crate.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use tracing::debug;
use vocab_core::domain::{DictionaryEntry, DictionaryResponse};
use vocab_core::normalize::normalize_entries;
use vocab_core::ports::{DictionaryService, PortError, PortResult};

pub const DEFAULT_BASE_URL: &str = "https://api.dictionaryapi.dev/api/v2/entries/en";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `DictionaryService` port over HTTP.
#[derive(Clone)]
pub struct FreeDictionaryAdapter {
    client: reqwest::Client,
    base_url: Url,
}

impl FreeDictionaryAdapter {
    /// Creates an adapter with its own client bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> PortResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Self::with_client(client, base_url)
    }

    /// Creates an adapter around an existing client.
    pub fn with_client(client: reqwest::Client, base_url: &str) -> PortResult<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PortError::Unexpected(format!("invalid dictionary URL '{}': {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(PortError::Unexpected(format!(
                "dictionary URL '{}' cannot take a path",
                base_url
            )));
        }
        Ok(Self { client, base_url })
    }

    /// The lookup URL for `word`, appended as a single percent-encoded segment.
    fn entry_url(&self, word: &str) -> PortResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| PortError::Unexpected(format!("dictionary URL '{}' cannot take a path", self.base_url)))?
            .pop_if_empty()
            .push(word);
        Ok(url)
    }
}

//=========================================================================================
// `DictionaryService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DictionaryService for FreeDictionaryAdapter {
    async fn lookup(&self, word: &str) -> PortResult<DictionaryResponse> {
        let url = self.entry_url(word)?;
        debug!(%url, "Fetching dictionary entry");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PortError::Transport(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Err(PortError::NotFoundInSource(word.to_string())),
            status if !status.is_success() => {
                return Err(PortError::Transport(format!(
                    "dictionary API returned status {}",
                    status
                )))
            }
            _ => {}
        }

        let entries: Vec<DictionaryEntry> = response
            .json()
            .await
            .map_err(|e| PortError::Transport(format!("failed to decode response: {}", e)))?;

        normalize_entries(word, entries)
    }
}
