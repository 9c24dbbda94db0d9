//! searcher module

pub mod query;
pub mod query_engine;

/// Re-exports
pub use query::{NormalizedQuery, SearchPage, SearchQuery};
pub use query_engine::{FuzzyOptions, evaluate};
