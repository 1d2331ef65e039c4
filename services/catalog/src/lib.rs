pub mod adapters;
pub mod cancel;
pub mod config;
pub mod error;
pub mod service;
pub mod transfer;

pub use service::WordCatalogService;
