//! Inverted index over question records.
//!
//! Three posting maps are kept side by side:
//! - token → question IDs
//! - normalized tag → question IDs
//! - metadata field → metadata value → question IDs

use std::collections::{HashMap, HashSet};

use crate::models::QuestionRecord;

/// Set of question IDs attached to one key
pub type PostingSet = HashSet<String>;

/// Metadata value → posting set, for a single field
pub type FieldPostings = HashMap<String, PostingSet>;

/// Token, tag and metadata posting maps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvertedIndex {
  /// token → IDs
  pub(crate) tokens: HashMap<String, PostingSet>,
  /// normalized tag → IDs
  pub(crate) tags: HashMap<String, PostingSet>,
  /// field → value → IDs
  pub(crate) metadata: HashMap<String, FieldPostings>,
}

impl InvertedIndex {
  /// Creates an empty index.
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds an index from `(id, record)` pairs.
  ///
  /// The result depends only on the pairs, not on their order.
  pub fn build<'a, I>(entries: I) -> Self
  where
    I: IntoIterator<Item = (&'a str, &'a QuestionRecord)>,
  {
    let mut index = Self::new();
    for (id, record) in entries {
      index.insert_record(id, record);
    }
    index
  }

  /// Folds one record's tokens, tags and metadata values into the posting maps.
  pub fn insert_record(&mut self, id: &str, record: &QuestionRecord) {
    for token in &record.search_tokens {
      self.tokens.entry(token.clone()).or_default().insert(id.to_string());
    }

    for tag in &record.tags {
      self.tags.entry(tag.clone()).or_default().insert(id.to_string());
    }

    for (field, values) in &record.metadata_index {
      let field_postings = self.metadata.entry(field.clone()).or_default();
      for value in values {
        field_postings.entry(value.clone()).or_default().insert(id.to_string());
      }
    }
  }

  /// Posting set of an exact token
  pub fn token_postings(&self, token: &str) -> Option<&PostingSet> {
    self.tokens.get(token)
  }

  /// Posting set of a normalized tag
  pub fn tag_postings(&self, tag: &str) -> Option<&PostingSet> {
    self.tags.get(tag)
  }

  /// Value postings of a metadata field
  pub fn metadata_field(&self, field: &str) -> Option<&FieldPostings> {
    self.metadata.get(field)
  }

  /// Every indexed token (vocabulary), in no particular order
  pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
    self.tokens.keys().map(String::as_str)
  }

  /// Number of distinct tokens
  pub fn token_count(&self) -> usize {
    self.tokens.len()
  }

  /// Number of distinct tags
  pub fn tag_count(&self) -> usize {
    self.tags.len()
  }
}
