pub mod domain;
pub mod normalize;
pub mod ports;

pub use domain::{
    Definition, DictionaryEntry, DictionaryResponse, ImportResult, Meaning, NewWord, Phonetic,
    Word, WordFilter, WordPage, WordUpdate,
};
pub use normalize::normalize_entries;
pub use ports::{DictionaryService, PortError, PortResult, WordStore};
