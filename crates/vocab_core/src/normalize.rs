//! crates/vocab_core/src/normalize.rs
//!
//! Reshapes the multi-entry payload of an external dictionary into a single
//! `DictionaryResponse`.

use std::collections::HashSet;

use crate::domain::{DictionaryEntry, DictionaryResponse};
use crate::ports::{PortError, PortResult};

/// Collapses raw entries into one response.
///
/// The first entry supplies the word, phonetic and meanings. Audio is the first
/// non-empty audio URL among its phonetic variants, and an empty top-level
/// phonetic is backfilled from the first variant that has text. Attribution URLs
/// are gathered from every entry, each distinct URL once, in first-seen order.
pub fn normalize_entries(word: &str, entries: Vec<DictionaryEntry>) -> PortResult<DictionaryResponse> {
    let mut entries = entries.into_iter();
    let first = entries
        .next()
        .ok_or_else(|| PortError::NotFoundInSource(word.to_string()))?;

    let mut seen = HashSet::new();
    let mut source_urls = Vec::new();
    let mut collect = |entry: &DictionaryEntry| {
        let urls = entry.source_url.iter().chain(entry.source_urls.iter());
        for url in urls.filter(|u| !u.is_empty()) {
            if seen.insert(url.clone()) {
                source_urls.push(url.clone());
            }
        }
    };
    collect(&first);
    for entry in entries {
        collect(&entry);
    }

    let mut phonetic = first.phonetic.filter(|p| !p.is_empty());
    let mut audio_url = None;
    for variant in &first.phonetics {
        if audio_url.is_none() {
            audio_url = variant.audio.clone().filter(|a| !a.is_empty());
        }
        if phonetic.is_none() {
            phonetic = variant.text.clone().filter(|t| !t.is_empty());
        }
        if audio_url.is_some() && phonetic.is_some() {
            break;
        }
    }

    Ok(DictionaryResponse {
        word: first.word,
        phonetic,
        audio_url,
        meanings: first.meanings,
        source_urls,
    })
}
