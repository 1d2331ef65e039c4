//! services/catalog/src/adapters/memory.rs
//!
//! A volatile `WordStore` kept entirely in process memory. It mirrors the SQLite
//! adapter's filtering, ordering and conflict rules and is used by tests and
//! short-lived tooling.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use rand::seq::IteratorRandom;
use tokio::sync::RwLock;
use vocab_core::domain::{NewWord, Word, WordFilter};
use vocab_core::ports::{PortError, PortResult, WordStore};

#[derive(Default)]
struct Inner {
    last_id: i64,
    words: BTreeMap<i64, Word>,
}

impl Inner {
    fn word_taken(&self, text: &str, except_id: Option<i64>) -> bool {
        self.words
            .values()
            .any(|w| w.word == text && Some(w.id) != except_id)
    }
}

/// An in-memory adapter that implements the `WordStore` port.
#[derive(Default)]
pub struct InMemoryWordStore {
    inner: RwLock<Inner>,
}

impl InMemoryWordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WordStore for InMemoryWordStore {
    async fn create(&self, word: NewWord) -> PortResult<Word> {
        let mut inner = self.inner.write().await;
        if inner.word_taken(&word.word, None) {
            return Err(PortError::duplicate_word(&word.word));
        }

        inner.last_id += 1;
        let now = Utc::now();
        let created = Word {
            id: inner.last_id,
            word: word.word,
            source: word.source,
            date_learned: word.date_learned,
            part_of_speech: word.part_of_speech,
            example_sentence: word.example_sentence,
            tags: word.tags,
            created_at: now,
            updated_at: now,
        };
        inner.words.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_by_id(&self, id: i64) -> PortResult<Word> {
        self.inner
            .read()
            .await
            .words
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Word {} not found", id)))
    }

    async fn get_by_word(&self, word: &str) -> PortResult<Word> {
        self.inner
            .read()
            .await
            .words
            .values()
            .find(|w| w.word == word)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Word '{}' not found", word)))
    }

    async fn list(&self, filter: &WordFilter) -> PortResult<Vec<Word>> {
        let inner = self.inner.read().await;
        let mut words: Vec<Word> = inner
            .words
            .values()
            .filter(|w| filter.matches(w))
            .cloned()
            .collect();
        words.sort_by(|a, b| {
            b.date_learned
                .cmp(&a.date_learned)
                .then_with(|| b.id.cmp(&a.id))
        });

        let offset = filter.page_offset() as usize;
        let page = words.into_iter().skip(offset);
        Ok(match filter.page_limit() {
            Some(limit) => page.take(limit as usize).collect(),
            None => page.collect(),
        })
    }

    async fn update(&self, word: Word) -> PortResult<Word> {
        let mut inner = self.inner.write().await;
        if !inner.words.contains_key(&word.id) {
            return Err(PortError::NotFound(format!("Word {} not found", word.id)));
        }
        if inner.word_taken(&word.word, Some(word.id)) {
            return Err(PortError::duplicate_word(&word.word));
        }

        let stored = inner
            .words
            .get_mut(&word.id)
            .ok_or_else(|| PortError::NotFound(format!("Word {} not found", word.id)))?;
        *stored = Word {
            created_at: stored.created_at,
            updated_at: Utc::now(),
            ..word
        };
        Ok(stored.clone())
    }

    async fn delete(&self, id: i64) -> PortResult<()> {
        self.inner
            .write()
            .await
            .words
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PortError::NotFound(format!("Word {} not found", id)))
    }

    async fn get_random(&self) -> PortResult<Word> {
        let inner = self.inner.read().await;
        inner
            .words
            .values()
            .choose(&mut rand::thread_rng())
            .cloned()
            .ok_or_else(|| PortError::NotFound("The catalog is empty".to_string()))
    }

    async fn count(&self, filter: &WordFilter) -> PortResult<i64> {
        let inner = self.inner.read().await;
        Ok(inner.words.values().filter(|w| filter.matches(w)).count() as i64)
    }

    async fn ping(&self) -> PortResult<()> {
        Ok(())
    }
}
