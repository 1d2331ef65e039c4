//! services/catalog/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `WordStore` port from the `core` crate. It handles all interactions
//! with the SQLite database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use vocab_core::domain::{non_empty, NewWord, Word, WordFilter};
use vocab_core::ports::{PortError, PortResult, WordStore};

/// Static DDL applied once at startup. Every statement is idempotent.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS words (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        word TEXT NOT NULL UNIQUE,
        source TEXT NOT NULL,
        date_learned TEXT NOT NULL,
        part_of_speech TEXT,
        example_sentence TEXT,
        tags TEXT NOT NULL DEFAULT '[]',
        created_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_words_date_learned ON words(date_learned)",
    "CREATE INDEX IF NOT EXISTS idx_words_source ON words(source)",
    "CREATE INDEX IF NOT EXISTS idx_words_word ON words(word)",
];

const SELECT_WORDS: &str = "SELECT id, word, source, date_learned, part_of_speech, \
     example_sentence, tags, created_at, updated_at FROM words";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `WordStore` port.
#[derive(Clone)]
pub struct SqliteWordStore {
    pool: SqlitePool,
}

impl SqliteWordStore {
    /// Creates a new `SqliteWordStore`.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Creates the `words` table and its indexes if they do not exist yet.
    pub async fn apply_schema(&self) -> Result<(), sqlx::Error> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct WordRecord {
    id: i64,
    word: String,
    source: String,
    date_learned: String,
    part_of_speech: Option<String>,
    example_sentence: Option<String>,
    tags: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WordRecord {
    fn to_domain(self) -> PortResult<Word> {
        let tags = serde_json::from_str(&self.tags).map_err(|e| {
            PortError::Unexpected(format!("corrupt tags for word {}: {}", self.id, e))
        })?;
        Ok(Word {
            id: self.id,
            word: self.word,
            source: self.source,
            date_learned: self.date_learned,
            part_of_speech: self.part_of_speech,
            example_sentence: self.example_sentence,
            tags,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn encode_tags(tags: &[String]) -> PortResult<String> {
    serde_json::to_string(tags).map_err(|e| PortError::Unexpected(e.to_string()))
}

/// Maps a failed write, turning a unique-constraint violation into a conflict.
fn map_write_error(e: sqlx::Error, word: &str) -> PortError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            PortError::duplicate_word(word)
        }
        _ => PortError::Unexpected(e.to_string()),
    }
}

fn clause(qb: &mut QueryBuilder<'_, Sqlite>, first: &mut bool) {
    qb.push(if *first { " WHERE " } else { " AND " });
    *first = false;
}

/// Appends the filter's predicates as a `WHERE` clause. All values are bound.
fn push_predicates(qb: &mut QueryBuilder<'_, Sqlite>, filter: &WordFilter) {
    let mut first = true;

    if let Some(search) = non_empty(&filter.search) {
        clause(qb, &mut first);
        qb.push("instr(word, ")
            .push_bind(search.to_string())
            .push(") > 0");
    }
    if let Some(source) = non_empty(&filter.source) {
        clause(qb, &mut first);
        qb.push("source = ").push_bind(source.to_string());
    }
    if let Some(tag) = non_empty(&filter.tag) {
        clause(qb, &mut first);
        qb.push("EXISTS (SELECT 1 FROM json_each(words.tags) WHERE json_each.value = ")
            .push_bind(tag.to_string())
            .push(")");
    }
    if let Some(from) = non_empty(&filter.from_date) {
        clause(qb, &mut first);
        qb.push("date_learned >= ").push_bind(from.to_string());
    }
    if let Some(to) = non_empty(&filter.to_date) {
        clause(qb, &mut first);
        qb.push("date_learned <= ").push_bind(to.to_string());
    }
}

//=========================================================================================
// `WordStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl WordStore for SqliteWordStore {
    async fn create(&self, word: NewWord) -> PortResult<Word> {
        let now = Utc::now();
        let tags = encode_tags(&word.tags)?;
        let record = sqlx::query_as::<_, WordRecord>(
            "INSERT INTO words (word, source, date_learned, part_of_speech, example_sentence, tags, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?) \
             RETURNING id, word, source, date_learned, part_of_speech, example_sentence, tags, created_at, updated_at",
        )
        .bind(&word.word)
        .bind(&word.source)
        .bind(&word.date_learned)
        .bind(&word.part_of_speech)
        .bind(&word.example_sentence)
        .bind(tags)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &word.word))?;

        debug!(id = record.id, word = %word.word, "Inserted word");
        record.to_domain()
    }

    async fn get_by_id(&self, id: i64) -> PortResult<Word> {
        let record = sqlx::query_as::<_, WordRecord>(
            "SELECT id, word, source, date_learned, part_of_speech, example_sentence, tags, created_at, updated_at \
             FROM words WHERE id = ?",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Word {} not found", id)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn get_by_word(&self, word: &str) -> PortResult<Word> {
        let record = sqlx::query_as::<_, WordRecord>(
            "SELECT id, word, source, date_learned, part_of_speech, example_sentence, tags, created_at, updated_at \
             FROM words WHERE word = ?",
        )
        .bind(word)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("Word '{}' not found", word)),
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn list(&self, filter: &WordFilter) -> PortResult<Vec<Word>> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_WORDS);
        push_predicates(&mut qb, filter);
        qb.push(" ORDER BY date_learned DESC, id DESC");

        let offset = filter.page_offset();
        match filter.page_limit() {
            Some(limit) => {
                qb.push(" LIMIT ").push_bind(i64::from(limit));
                if offset > 0 {
                    qb.push(" OFFSET ").push_bind(i64::from(offset));
                }
            }
            // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
            None if offset > 0 => {
                qb.push(" LIMIT -1 OFFSET ").push_bind(i64::from(offset));
            }
            None => {}
        }

        debug!(sql = qb.sql(), "Listing words");
        let records = qb
            .build_query_as::<WordRecord>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        records.into_iter().map(WordRecord::to_domain).collect()
    }

    async fn update(&self, word: Word) -> PortResult<Word> {
        let now = Utc::now();
        let tags = encode_tags(&word.tags)?;
        let record = sqlx::query_as::<_, WordRecord>(
            "UPDATE words SET word = ?, source = ?, date_learned = ?, part_of_speech = ?, \
             example_sentence = ?, tags = ?, updated_at = ? WHERE id = ? \
             RETURNING id, word, source, date_learned, part_of_speech, example_sentence, tags, created_at, updated_at",
        )
        .bind(&word.word)
        .bind(&word.source)
        .bind(&word.date_learned)
        .bind(&word.part_of_speech)
        .bind(&word.example_sentence)
        .bind(tags)
        .bind(now)
        .bind(word.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &word.word))?
        .ok_or_else(|| PortError::NotFound(format!("Word {} not found", word.id)))?;

        record.to_domain()
    }

    async fn delete(&self, id: i64) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM words WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("Word {} not found", id)));
        }
        Ok(())
    }

    async fn get_random(&self) -> PortResult<Word> {
        let record = sqlx::query_as::<_, WordRecord>(
            "SELECT id, word, source, date_learned, part_of_speech, example_sentence, tags, created_at, updated_at \
             FROM words ORDER BY RANDOM() LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?
        .ok_or_else(|| PortError::NotFound("The catalog is empty".to_string()))?;

        record.to_domain()
    }

    async fn count(&self, filter: &WordFilter) -> PortResult<i64> {
        let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM words");
        push_predicates(&mut qb, filter);

        let row = qb
            .build()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        row.try_get::<i64, _>(0)
            .map_err(|e| PortError::Unexpected(e.to_string()))
    }

    async fn ping(&self) -> PortResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn setup_store() -> SqliteWordStore {
        // An in-memory database lives as long as its connection, so pin the pool to one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect("sqlite::memory:")
            .await
            .expect("Failed to open in-memory database");
        let store = SqliteWordStore::new(pool);
        store.apply_schema().await.expect("Failed to apply schema");
        store
    }

    fn new_word(word: &str, source: &str, date: &str, tags: &[&str]) -> NewWord {
        NewWord {
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..NewWord::new(word, source, date)
        }
    }

    async fn seed(store: &SqliteWordStore) {
        for word in [
            new_word("ephemeral", "Book: The Road", "2024-01-15", &["literature", "nature"]),
            new_word("ubiquitous", "Article", "2024-02-01", &[]),
            new_word("serendipity", "Conversation", "2024-02-28", &["positive"]),
            new_word("lithe", "Article", "2024-03-01", &["lit"]),
        ] {
            store.create(word).await.expect("seed insert");
        }
    }

    #[tokio::test]
    async fn test_create_assigns_identity_and_timestamps() {
        let store = setup_store().await;

        let created = store
            .create(NewWord {
                part_of_speech: Some("adjective".to_string()),
                example_sentence: Some("The ephemeral beauty of cherry blossoms".to_string()),
                ..new_word("ephemeral", "Book: The Road", "2024-01-15", &["literature", "nature"])
            })
            .await
            .expect("create");

        assert!(created.id > 0);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(created.part_of_speech.as_deref(), Some("adjective"));
        assert_eq!(created.tags, vec!["literature", "nature"]);

        let second = store
            .create(new_word("ubiquitous", "Article", "2024-02-20", &[]))
            .await
            .expect("create");
        assert!(second.id > created.id);
        assert_eq!(second.part_of_speech, None);
        assert!(second.tags.is_empty());
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let store = setup_store().await;
        store
            .create(new_word("eloquent", "Speech", "2024-04-05", &[]))
            .await
            .expect("first create");

        let err = store
            .create(new_word("eloquent", "Other", "2024-05-05", &["x"]))
            .await
            .unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)), "got {err:?}");

        // Word uniqueness is case-sensitive.
        store
            .create(new_word("Eloquent", "Speech", "2024-04-05", &[]))
            .await
            .expect("different case is a different word");
    }

    #[tokio::test]
    async fn test_get_by_id_and_word() {
        let store = setup_store().await;
        let created = store
            .create(new_word("serendipity", "Conversation", "2024-03-10", &["positive"]))
            .await
            .unwrap();

        let by_id = store.get_by_id(created.id).await.unwrap();
        assert_eq!(by_id, created);
        let by_word = store.get_by_word("serendipity").await.unwrap();
        assert_eq!(by_word.id, created.id);

        assert!(matches!(store.get_by_id(9999).await, Err(PortError::NotFound(_))));
        assert!(matches!(
            store.get_by_word("nonexistent").await,
            Err(PortError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_list_orders_newest_first() {
        let store = setup_store().await;
        seed(&store).await;

        let words = store.list(&WordFilter::default()).await.unwrap();
        let texts: Vec<_> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(texts, vec!["lithe", "serendipity", "ubiquitous", "ephemeral"]);
        assert_eq!(store.count(&WordFilter::default()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_tag_filter_is_exact_membership() {
        let store = setup_store().await;
        seed(&store).await;

        let filter = WordFilter {
            tag: Some("lit".to_string()),
            ..Default::default()
        };
        let words = store.list(&filter).await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "lithe");
        assert_eq!(store.count(&filter).await.unwrap(), 1);

        let filter = WordFilter {
            tag: Some("nature".to_string()),
            ..Default::default()
        };
        let words = store.list(&filter).await.unwrap();
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "ephemeral");
    }

    #[tokio::test]
    async fn test_date_range_is_inclusive() {
        let store = setup_store().await;
        seed(&store).await;

        let filter = WordFilter {
            from_date: Some("2024-02-01".to_string()),
            to_date: Some("2024-02-28".to_string()),
            ..Default::default()
        };
        let words = store.list(&filter).await.unwrap();
        let texts: Vec<_> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(texts, vec!["serendipity", "ubiquitous"]);
    }

    #[tokio::test]
    async fn test_search_and_source_combine() {
        let store = setup_store().await;
        seed(&store).await;

        let filter = WordFilter {
            search: Some("i".to_string()),
            source: Some("Article".to_string()),
            ..Default::default()
        };
        let words = store.list(&filter).await.unwrap();
        let texts: Vec<_> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(texts, vec!["lithe", "ubiquitous"]);

        // Search is case-sensitive.
        let filter = WordFilter {
            search: Some("SEREN".to_string()),
            ..Default::default()
        };
        assert_eq!(store.count(&filter).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pagination_applies_after_ordering() {
        let store = setup_store().await;
        // Same date so the id tiebreak decides the order.
        let a = store.create(new_word("alpha", "s", "2024-01-01", &[])).await.unwrap();
        let b = store.create(new_word("beta", "s", "2024-01-01", &[])).await.unwrap();
        let c = store.create(new_word("gamma", "s", "2024-01-01", &[])).await.unwrap();

        let first_page = store
            .list(&WordFilter {
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(
            first_page.iter().map(|w| w.id).collect::<Vec<_>>(),
            vec![c.id, b.id]
        );

        let second_page = store
            .list(&WordFilter {
                limit: Some(2),
                offset: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(second_page.len(), 1);
        assert_eq!(second_page[0].id, a.id);

        let offset_only = store
            .list(&WordFilter {
                offset: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(offset_only.len(), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_record() {
        let store = setup_store().await;
        let created = store
            .create(NewWord {
                part_of_speech: Some("noun".to_string()),
                ..new_word("quixotic", "Novel", "2024-06-01", &["a"])
            })
            .await
            .unwrap();

        let mut changed = created.clone();
        changed.source = "Essay".to_string();
        changed.part_of_speech = None;
        changed.tags = vec!["b".to_string(), "c".to_string()];
        let updated = store.update(changed).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.source, "Essay");
        assert_eq!(updated.part_of_speech, None);
        assert_eq!(updated.tags, vec!["b", "c"]);
        assert_eq!(updated.created_at, created.created_at);
        assert!(updated.updated_at >= created.updated_at);

        let mut missing = created.clone();
        missing.id = 4242;
        assert!(matches!(store.update(missing).await, Err(PortError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_into_existing_word_is_conflict() {
        let store = setup_store().await;
        store.create(new_word("one", "s", "2024-01-01", &[])).await.unwrap();
        let mut two = store.create(new_word("two", "s", "2024-01-02", &[])).await.unwrap();

        two.word = "one".to_string();
        assert!(matches!(store.update(two).await, Err(PortError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_update_missing_id_is_not_found_even_when_text_taken() {
        let store = setup_store().await;
        let taken = store.create(new_word("taken", "s", "2024-01-01", &[])).await.unwrap();

        let mut ghost = taken.clone();
        ghost.id = 999;
        assert!(matches!(store.update(ghost).await, Err(PortError::NotFound(_))));
        assert_eq!(store.get_by_id(taken.id).await.unwrap(), taken);
    }

    #[tokio::test]
    async fn test_delete_and_random() {
        let store = setup_store().await;
        assert!(matches!(store.get_random().await, Err(PortError::NotFound(_))));

        seed(&store).await;
        let all = store.list(&WordFilter::default()).await.unwrap();
        for _ in 0..10 {
            let picked = store.get_random().await.unwrap();
            assert!(all.contains(&picked));
        }

        let victim = all[0].id;
        store.delete(victim).await.unwrap();
        assert!(matches!(store.delete(victim).await, Err(PortError::NotFound(_))));
        assert_eq!(store.count(&WordFilter::default()).await.unwrap(), 3);
        store.ping().await.unwrap();
    }
}
