//! fuzzy module
//!
//! Approximate token matching used by the query engine to tolerate misspellings.

pub mod sequence_matcher;

pub use sequence_matcher::{SequenceMatcher, get_close_matches};
