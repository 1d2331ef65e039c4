//! crates/vocab_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the catalog's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of a specific storage engine or definition provider.

use async_trait::async_trait;

use crate::domain::{DictionaryResponse, NewWord, Word, WordFilter};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// The error type for all port and service operations.
///
/// Catalog misses (`NotFound`) and definition-source misses (`NotFoundInSource`)
/// are separate variants so callers can tell "not in your catalog" apart from
/// "no public definition exists".
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Word not found in dictionary: {0}")]
    NotFoundInSource(String),
    #[error("Dictionary transport error: {0}")]
    Transport(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Operation cancelled")]
    Cancelled,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// Builds the conflict raised for a duplicate word text, whether it was caught
    /// by a pre-check or by the storage constraint.
    pub fn duplicate_word(word: &str) -> Self {
        PortError::Conflict(format!("word '{}' already exists", word))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Durable storage for the catalog. The implementation's unique constraint on the
/// word text is the final authority on duplicates.
#[async_trait]
pub trait WordStore: Send + Sync {
    /// Inserts a word, assigning its id and timestamps.
    async fn create(&self, word: NewWord) -> PortResult<Word>;

    async fn get_by_id(&self, id: i64) -> PortResult<Word>;

    /// Exact, case-sensitive lookup by word text.
    async fn get_by_word(&self, word: &str) -> PortResult<Word>;

    /// Matching words ordered by `date_learned` then `id`, both descending, with
    /// pagination applied after ordering.
    async fn list(&self, filter: &WordFilter) -> PortResult<Vec<Word>>;

    /// Replaces every field of the record with the same id and refreshes `updated_at`.
    async fn update(&self, word: Word) -> PortResult<Word>;

    async fn delete(&self, id: i64) -> PortResult<()>;

    /// A uniformly random word, or `NotFound` when the catalog is empty.
    async fn get_random(&self) -> PortResult<Word>;

    /// Number of words matching the filter's predicates; pagination is ignored.
    async fn count(&self, filter: &WordFilter) -> PortResult<i64>;

    /// Verifies the storage engine is reachable.
    async fn ping(&self) -> PortResult<()>;
}

#[async_trait]
pub trait DictionaryService: Send + Sync {
    /// Looks up a word and returns its normalized definition.
    async fn lookup(&self, word: &str) -> PortResult<DictionaryResponse>;
}
