use std::sync::Arc;

use async_trait::async_trait;
use catalog_lib::adapters::{InMemoryWordStore, SqliteWordStore};
use catalog_lib::WordCatalogService;
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vocab_core::{
    DictionaryResponse, DictionaryService, NewWord, PortError, PortResult, Word, WordFilter,
};

struct NoDictionary;

#[async_trait]
impl DictionaryService for NoDictionary {
    async fn lookup(&self, word: &str) -> PortResult<DictionaryResponse> {
        Err(PortError::NotFoundInSource(word.to_string()))
    }
}

async fn sqlite_service(dir: &TempDir) -> WordCatalogService {
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("words.db").display());
    let pool = SqlitePoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("Failed to open database file");
    let store = SqliteWordStore::new(pool);
    store.apply_schema().await.expect("Failed to apply schema");
    // Applying the schema twice must be harmless.
    store.apply_schema().await.expect("Failed to re-apply schema");
    WordCatalogService::new(Arc::new(store), Arc::new(NoDictionary))
}

fn tuples(words: &[Word]) -> Vec<NewWord> {
    let mut rows: Vec<NewWord> = words.iter().map(NewWord::from).collect();
    rows.sort_by(|a, b| a.word.cmp(&b.word));
    rows
}

#[tokio::test]
async fn test_export_from_sqlite_imports_into_empty_store() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let source = sqlite_service(&dir).await;
    let cancel = CancellationToken::new();

    for word in [
        NewWord {
            part_of_speech: Some("adjective".to_string()),
            example_sentence: Some("The ephemeral beauty of cherry blossoms".to_string()),
            tags: vec!["literature".to_string(), "nature".to_string()],
            ..NewWord::new("ephemeral", "Book: The Road", "2024-01-15")
        },
        NewWord::new("ubiquitous", "Article", "2024-02-20"),
        NewWord {
            tags: vec!["positive".to_string()],
            ..NewWord::new("serendipity", "Conversation, at lunch", "2024-03-10")
        },
    ] {
        source.create(word, &cancel).await.expect("create");
    }

    let export_path = dir.path().join("export.csv");
    let file = tokio::fs::File::create(&export_path).await.unwrap();
    source.export_csv(file, &cancel).await.expect("export");

    let target = WordCatalogService::new(Arc::new(InMemoryWordStore::new()), Arc::new(NoDictionary));
    let file = tokio::fs::File::open(&export_path).await.unwrap();
    let result = target.import_csv(file, &cancel).await.expect("import");

    assert_eq!(result.imported, 3);
    assert_eq!(result.skipped, 0);

    let all = WordFilter::default();
    assert_eq!(
        tuples(&source.list(&all, &cancel).await.unwrap()),
        tuples(&target.list(&all, &cancel).await.unwrap())
    );
}

#[tokio::test]
async fn test_import_into_sqlite_reports_rows() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let service = sqlite_service(&dir).await;
    let cancel = CancellationToken::new();

    let input = "word,source,date_learned,tags\n\
                 lithe,Poem,2024-02-01,lit\n\
                 ephemeral,,2024-02-02,literature\n\
                 verdant,Walk,2024-02-28,\"nature, literature\"\n";
    let result = service.import_csv(input.as_bytes(), &cancel).await.unwrap();

    assert_eq!(result.imported, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors, vec!["line 3: missing required field: source"]);

    let tagged = service
        .list_page(
            &WordFilter {
                tag: Some("lit".to_string()),
                ..Default::default()
            },
            &cancel,
        )
        .await
        .unwrap();
    assert_eq!(tagged.total, 1);
    assert_eq!(tagged.words[0].word, "lithe");

    let february = WordFilter {
        from_date: Some("2024-02-01".to_string()),
        to_date: Some("2024-02-28".to_string()),
        ..Default::default()
    };
    assert_eq!(service.count(&february, &cancel).await.unwrap(), 2);
}
