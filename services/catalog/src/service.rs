//! services/catalog/src/service.rs
//!
//! `WordCatalogService` validates requests and sequences calls to the word store,
//! the CSV pipeline and the dictionary. It holds no state of its own beyond the
//! shared port handles.

use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::info;
use vocab_core::domain::{
    DictionaryResponse, ImportResult, NewWord, Word, WordFilter, WordPage, WordUpdate,
};
use vocab_core::ports::{DictionaryService, PortError, PortResult, WordStore};

use crate::cancel::cancellable;
use crate::transfer;

#[derive(Clone)]
pub struct WordCatalogService {
    store: Arc<dyn WordStore>,
    dictionary: Arc<dyn DictionaryService>,
}

fn require(field: &str, value: &str) -> PortResult<()> {
    if value.trim().is_empty() {
        return Err(PortError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

impl WordCatalogService {
    pub fn new(store: Arc<dyn WordStore>, dictionary: Arc<dyn DictionaryService>) -> Self {
        Self { store, dictionary }
    }

    /// Fails with `Conflict` when `word` is already catalogued. Best effort only:
    /// the store's unique constraint settles races.
    async fn ensure_unused(&self, word: &str, cancel: &CancellationToken) -> PortResult<()> {
        match cancellable(cancel, self.store.get_by_word(word)).await {
            Ok(_) => Err(PortError::duplicate_word(word)),
            Err(PortError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    pub async fn create(&self, request: NewWord, cancel: &CancellationToken) -> PortResult<Word> {
        require("word", &request.word)?;
        require("source", &request.source)?;
        require("date_learned", &request.date_learned)?;

        self.ensure_unused(&request.word, cancel).await?;
        let word = cancellable(cancel, self.store.create(request)).await?;
        info!(id = word.id, word = %word.word, "Word created");
        Ok(word)
    }

    pub async fn get(&self, id: i64, cancel: &CancellationToken) -> PortResult<Word> {
        cancellable(cancel, self.store.get_by_id(id)).await
    }

    pub async fn list(&self, filter: &WordFilter, cancel: &CancellationToken) -> PortResult<Vec<Word>> {
        cancellable(cancel, self.store.list(filter)).await
    }

    /// One page of matches plus the unpaginated total.
    pub async fn list_page(&self, filter: &WordFilter, cancel: &CancellationToken) -> PortResult<WordPage> {
        let words = cancellable(cancel, self.store.list(filter)).await?;
        let total = cancellable(cancel, self.store.count(&filter.without_pagination())).await?;
        Ok(WordPage { words, total })
    }

    pub async fn count(&self, filter: &WordFilter, cancel: &CancellationToken) -> PortResult<i64> {
        cancellable(cancel, self.store.count(filter)).await
    }

    /// Merges the fields present in `update` over the stored word and writes it back.
    pub async fn update(
        &self,
        id: i64,
        update: WordUpdate,
        cancel: &CancellationToken,
    ) -> PortResult<Word> {
        let mut word = cancellable(cancel, self.store.get_by_id(id)).await?;

        if let Some(text) = update.word.as_deref() {
            require("word", text)?;
            if text != word.word {
                self.ensure_unused(text, cancel).await?;
            }
        }
        update.apply_to(&mut word);

        cancellable(cancel, self.store.update(word)).await
    }

    pub async fn delete(&self, id: i64, cancel: &CancellationToken) -> PortResult<()> {
        cancellable(cancel, self.store.delete(id)).await?;
        info!(id, "Word deleted");
        Ok(())
    }

    pub async fn random(&self, cancel: &CancellationToken) -> PortResult<Word> {
        cancellable(cancel, self.store.get_random()).await
    }

    /// Looks up the catalogued word's definition. A missing catalog entry surfaces
    /// as `NotFound`, a missing dictionary entry as `NotFoundInSource`.
    pub async fn get_definition(
        &self,
        id: i64,
        cancel: &CancellationToken,
    ) -> PortResult<DictionaryResponse> {
        let word = cancellable(cancel, self.store.get_by_id(id)).await?;
        cancellable(cancel, self.dictionary.lookup(&word.word)).await
    }

    /// The first part of speech the dictionary lists for `word`, if any.
    pub async fn suggest_part_of_speech(
        &self,
        word: &str,
        cancel: &CancellationToken,
    ) -> PortResult<Option<String>> {
        require("word", word)?;
        let response = cancellable(cancel, self.dictionary.lookup(word)).await?;
        Ok(response
            .meanings
            .into_iter()
            .next()
            .map(|m| m.part_of_speech))
    }

    pub async fn import_csv<R>(&self, reader: R, cancel: &CancellationToken) -> PortResult<ImportResult>
    where
        R: AsyncRead + Unpin + Send,
    {
        transfer::import_csv(self.store.as_ref(), reader, cancel).await
    }

    pub async fn export_csv<W>(&self, writer: W, cancel: &CancellationToken) -> PortResult<()>
    where
        W: AsyncWrite + Unpin + Send,
    {
        transfer::export_csv(self.store.as_ref(), writer, cancel).await
    }

    /// Reports whether the storage engine answers.
    pub async fn health(&self, cancel: &CancellationToken) -> PortResult<()> {
        cancellable(cancel, self.store.ping()).await
    }
}
