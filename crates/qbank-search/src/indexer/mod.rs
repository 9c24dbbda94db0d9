//! indexer module
//!
//! Builds the in-memory inverted index over a question corpus and keeps it in
//! sync with the on-disk cache.

pub mod filter_values;
pub mod inverted_index;
pub mod question_index;
pub mod report;

/// Re-exports
pub use filter_values::{append_record_facets, collect_filter_values};
pub use inverted_index::{FieldPostings, InvertedIndex, PostingSet};
pub use question_index::{AddOutcome, QuestionIndex};
pub use report::{IndexBuildReport, IndexSource};
