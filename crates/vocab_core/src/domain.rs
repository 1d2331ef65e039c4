//! crates/vocab_core/src/domain.rs
//!
//! Defines the pure, core data structures for the vocabulary catalog.
//! These structs are independent of any database or transport format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Catalog Entities
//=========================================================================================

/// A learned word together with where and when it was picked up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    pub id: i64,
    pub word: String,
    pub source: String,
    /// Calendar date as `YYYY-MM-DD`, so string order is chronological order.
    pub date_learned: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// The fields a caller supplies when adding a word. Identity and timestamps
/// are assigned by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewWord {
    pub word: String,
    pub source: String,
    pub date_learned: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub part_of_speech: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example_sentence: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewWord {
    pub fn new(
        word: impl Into<String>,
        source: impl Into<String>,
        date_learned: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            source: source.into(),
            date_learned: date_learned.into(),
            ..Default::default()
        }
    }
}

impl From<&Word> for NewWord {
    fn from(word: &Word) -> Self {
        Self {
            word: word.word.clone(),
            source: word.source.clone(),
            date_learned: word.date_learned.clone(),
            part_of_speech: word.part_of_speech.clone(),
            example_sentence: word.example_sentence.clone(),
            tags: word.tags.clone(),
        }
    }
}

/// A partial update. `None` leaves the stored value alone; `Some` overwrites it.
///
/// The optional text fields are doubly wrapped so that "not mentioned" (`None`)
/// and "clear this field" (`Some(None)`) stay distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordUpdate {
    pub word: Option<String>,
    pub source: Option<String>,
    pub date_learned: Option<String>,
    pub part_of_speech: Option<Option<String>>,
    pub example_sentence: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
}

impl WordUpdate {
    /// Applies every present field onto `word`.
    pub fn apply_to(self, word: &mut Word) {
        if let Some(text) = self.word {
            word.word = text;
        }
        if let Some(source) = self.source {
            word.source = source;
        }
        if let Some(date_learned) = self.date_learned {
            word.date_learned = date_learned;
        }
        if let Some(part_of_speech) = self.part_of_speech {
            word.part_of_speech = part_of_speech;
        }
        if let Some(example_sentence) = self.example_sentence {
            word.example_sentence = example_sentence;
        }
        if let Some(tags) = self.tags {
            word.tags = tags;
        }
    }
}

//=========================================================================================
// Query Descriptors
//=========================================================================================

/// Selects a subset of the catalog. Every field is optional and all present
/// predicates must hold at once; the default filter matches every word.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordFilter {
    /// Case-sensitive substring of the word text.
    pub search: Option<String>,
    /// Exact source match.
    pub source: Option<String>,
    /// Exact membership in the tag list.
    pub tag: Option<String>,
    /// Inclusive lower bound on `date_learned`.
    pub from_date: Option<String>,
    /// Inclusive upper bound on `date_learned`.
    pub to_date: Option<String>,
    /// Page size. `None` or zero returns every match.
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl WordFilter {
    /// Returns the filter with pagination removed, as used for counting.
    pub fn without_pagination(&self) -> Self {
        Self {
            limit: None,
            offset: None,
            ..self.clone()
        }
    }

    /// Evaluates the predicates against a single word.
    pub fn matches(&self, word: &Word) -> bool {
        if let Some(search) = non_empty(&self.search) {
            if !word.word.contains(search) {
                return false;
            }
        }
        if let Some(source) = non_empty(&self.source) {
            if word.source != source {
                return false;
            }
        }
        if let Some(tag) = non_empty(&self.tag) {
            if !word.tags.iter().any(|t| t == tag) {
                return false;
            }
        }
        if let Some(from) = non_empty(&self.from_date) {
            if word.date_learned.as_str() < from {
                return false;
            }
        }
        if let Some(to) = non_empty(&self.to_date) {
            if word.date_learned.as_str() > to {
                return false;
            }
        }
        true
    }

    /// The effective page size; zero is treated as "unbounded".
    pub fn page_limit(&self) -> Option<u32> {
        self.limit.filter(|&l| l > 0)
    }

    pub fn page_offset(&self) -> u32 {
        self.offset.unwrap_or(0)
    }
}

/// Treats an empty string filter value the same as an absent one.
pub fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// One page of a listing plus the number of words matching the same predicates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordPage {
    pub words: Vec<Word>,
    pub total: i64,
}

//=========================================================================================
// Bulk Import
//=========================================================================================

/// Outcome of one CSV import. Row failures are data, not errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub imported: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

impl ImportResult {
    /// Counts a row as skipped and records why, prefixed with its line number.
    pub fn skip(&mut self, line: u64, reason: impl std::fmt::Display) {
        self.skipped += 1;
        self.errors.push(format!("line {}: {}", line, reason));
    }
}

//=========================================================================================
// Dictionary Lookups
//=========================================================================================

/// One raw entry as returned by the external definition source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub source_urls: Vec<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// A pronunciation variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phonetic {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub antonyms: Vec<String>,
}

/// The normalized lookup result handed back to callers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DictionaryResponse {
    pub word: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phonetic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    pub meanings: Vec<Meaning>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_urls: Vec<String>,
}
