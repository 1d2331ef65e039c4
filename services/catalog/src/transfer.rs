//! services/catalog/src/transfer.rs
//!
//! Bulk CSV import and export on top of any `WordStore`.
//!
//! Import is a single ordered pass: each record is parsed, validated, checked for
//! duplicates and inserted on its own, and any row-level failure is written into the
//! `ImportResult` instead of being raised. Only a missing required column (or the
//! stream itself failing) aborts the whole import.

use std::collections::HashMap;

use csv_async::{AsyncReaderBuilder, AsyncWriter, StringRecord};
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use vocab_core::domain::{ImportResult, NewWord, WordFilter};
use vocab_core::ports::{PortError, PortResult, WordStore};

use crate::cancel::cancellable;

/// Column order written by `export_csv`.
pub const EXPORT_HEADER: [&str; 6] = [
    "word",
    "source",
    "date_learned",
    "part_of_speech",
    "example_sentence",
    "tags",
];

const REQUIRED_COLUMNS: [&str; 3] = ["word", "source", "date_learned"];

//=========================================================================================
// Header Mapping
//=========================================================================================

/// Positions of the known columns within an import file.
#[derive(Debug)]
struct ColumnMap {
    word: usize,
    source: usize,
    date_learned: usize,
    part_of_speech: Option<usize>,
    example_sentence: Option<usize>,
    tags: Option<usize>,
}

impl ColumnMap {
    /// Maps header names case-insensitively, ignoring surrounding whitespace.
    fn from_header(header: &StringRecord) -> PortResult<Self> {
        let index: HashMap<String, usize> = header
            .iter()
            .enumerate()
            .map(|(i, name)| (name.trim().to_lowercase(), i))
            .collect();

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|col| !index.contains_key(*col))
            .collect();
        if !missing.is_empty() {
            return Err(PortError::MalformedInput(format!(
                "missing required column: {}",
                missing.join(", ")
            )));
        }

        Ok(Self {
            word: index["word"],
            source: index["source"],
            date_learned: index["date_learned"],
            part_of_speech: index.get("part_of_speech").copied(),
            example_sentence: index.get("example_sentence").copied(),
            tags: index.get("tags").copied(),
        })
    }

    /// Builds a word from one record, or names the first required field left empty.
    fn parse_row(&self, record: &StringRecord) -> Result<NewWord, &'static str> {
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");
        let optional = |idx: Option<usize>| {
            idx.map(field)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let word = field(self.word);
        let source = field(self.source);
        let date_learned = field(self.date_learned);
        for (name, value) in REQUIRED_COLUMNS.into_iter().zip([word, source, date_learned]) {
            if value.is_empty() {
                return Err(name);
            }
        }

        let tags = optional(self.tags)
            .map(|raw| raw.split(',').map(|t| t.trim().to_string()).collect())
            .unwrap_or_default();

        Ok(NewWord {
            word: word.to_string(),
            source: source.to_string(),
            date_learned: date_learned.to_string(),
            part_of_speech: optional(self.part_of_speech),
            example_sentence: optional(self.example_sentence),
            tags,
        })
    }
}

//=========================================================================================
// Import
//=========================================================================================

/// Streams CSV records from `reader` into `store`.
///
/// Line numbers in the returned errors count records, with the header as line 1.
pub async fn import_csv<R>(
    store: &dyn WordStore,
    reader: R,
    cancel: &CancellationToken,
) -> PortResult<ImportResult>
where
    R: AsyncRead + Unpin + Send,
{
    let mut csv = AsyncReaderBuilder::new().create_reader(reader);

    let header = cancellable(cancel, async {
        csv.headers()
            .await
            .map(StringRecord::clone)
            .map_err(|e| PortError::MalformedInput(format!("failed to read CSV header: {}", e)))
    })
    .await?;
    let columns = ColumnMap::from_header(&header)?;

    let mut result = ImportResult::default();
    let records = csv.records();
    tokio::pin!(records);
    let mut line: u64 = 1;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(PortError::Cancelled),
            next = records.next() => next,
        };
        let Some(next) = next else { break };
        line += 1;

        let record = match next {
            Ok(record) => record,
            Err(e) if matches!(e.kind(), csv_async::ErrorKind::Io(_)) => {
                return Err(PortError::Unexpected(format!(
                    "failed to read CSV at line {}: {}",
                    line, e
                )));
            }
            Err(e) => {
                warn!(line, error = %e, "Skipping unparsable CSV row");
                result.skip(line, e);
                continue;
            }
        };

        let word = match columns.parse_row(&record) {
            Ok(word) => word,
            Err(field) => {
                result.skip(line, format!("missing required field: {}", field));
                continue;
            }
        };

        match cancellable(cancel, store.get_by_word(&word.word)).await {
            Ok(_) => {
                result.skip(line, format!("word '{}' already exists", word.word));
                continue;
            }
            Err(PortError::Cancelled) => return Err(PortError::Cancelled),
            // The insert below stays authoritative when the pre-check cannot answer.
            Err(_) => {}
        }

        match cancellable(cancel, store.create(word)).await {
            Ok(_) => result.imported += 1,
            Err(PortError::Cancelled) => return Err(PortError::Cancelled),
            Err(PortError::Conflict(reason)) => result.skip(line, reason),
            Err(e) => {
                error!(line, error = %e, "Failed to store imported word");
                result.skip(line, e);
            }
        }
    }

    info!(
        imported = result.imported,
        skipped = result.skipped,
        "CSV import finished"
    );
    Ok(result)
}

//=========================================================================================
// Export
//=========================================================================================

/// Writes the whole catalog to `writer` in the default list order.
pub async fn export_csv<W>(
    store: &dyn WordStore,
    writer: W,
    cancel: &CancellationToken,
) -> PortResult<()>
where
    W: AsyncWrite + Unpin + Send,
{
    let words = cancellable(cancel, store.list(&WordFilter::default())).await?;
    let write_error = |e: csv_async::Error| PortError::Unexpected(format!("failed to write CSV: {}", e));

    let mut csv = AsyncWriter::from_writer(writer);
    csv.write_record(&EXPORT_HEADER).await.map_err(write_error)?;

    for word in &words {
        if cancel.is_cancelled() {
            return Err(PortError::Cancelled);
        }
        let tags = word.tags.join(",");
        csv.write_record(&[
            word.word.as_str(),
            word.source.as_str(),
            word.date_learned.as_str(),
            word.part_of_speech.as_deref().unwrap_or(""),
            word.example_sentence.as_deref().unwrap_or(""),
            tags.as_str(),
        ])
        .await
        .map_err(write_error)?;
    }

    csv.flush()
        .await
        .map_err(|e| PortError::Unexpected(format!("failed to flush CSV: {}", e)))?;
    info!(count = words.len(), "CSV export finished");
    Ok(())
}
