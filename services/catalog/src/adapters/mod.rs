pub mod db;
pub mod dictionary;
pub mod memory;

pub use db::SqliteWordStore;
pub use dictionary::FreeDictionaryAdapter;
pub use memory::InMemoryWordStore;
