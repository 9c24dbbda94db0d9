//! Question index: corpus records plus their inverted index.
//!
//! Responsible for
//! - deriving IDs and corpus order from raw payloads
//! - reusing or rebuilding the inverted index (cache fingerprint check)
//! - boolean search with stable, corpus-ordered pagination
//! - incremental adds followed by a cache rewrite

use std::collections::HashMap;
use std::path::Path;

use serde_json::Value as JsonValue;
use tracing::{debug, info, warn};

use crate::cache::{Fingerprint, IndexCache};
use crate::corpus::load_questions;
use crate::errors::{CacheError, CorpusError};
use crate::indexer::filter_values::{append_record_facets, collect_filter_values};
use crate::indexer::inverted_index::InvertedIndex;
use crate::indexer::report::{IndexBuildReport, IndexSource};
use crate::models::{FilterValues, QuestionRecord};
use crate::searcher::{FuzzyOptions, SearchPage, SearchQuery, evaluate};

/// Result of `QuestionIndex::add`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
  /// Indexed and searchable
  Indexed,
  /// Stored without an ID; returned by `all()` only
  Unindexed,
  /// ID already indexed; stored but not searchable
  Duplicate,
}

/// In-memory search index over a question corpus.
///
/// # Invariants
/// - every ID in `ordered_ids` is a key of `id_lookup` and vice versa
/// - `ordered_ids` keeps ingestion order; the first record with a given ID wins
/// - every ID in a posting set appears in `ordered_ids`
#[derive(Debug)]
pub struct QuestionIndex {
  /// Every ingested record, including unindexed ones
  records: Vec<QuestionRecord>,

  /// ID → position in `records`
  id_lookup: HashMap<String, usize>,

  /// Indexed IDs in corpus order
  ordered_ids: Vec<String>,

  /// Posting maps
  index: InvertedIndex,

  /// Raw facet values, deduplicated on read
  filter_values: FilterValues,

  /// Fingerprint of `ordered_ids`
  fingerprint: Fingerprint,

  /// Cache handle (None = persistence disabled)
  cache: Option<IndexCache>,

  /// Fuzzy expansion parameters
  fuzzy: FuzzyOptions,

  /// Summary of the initial build
  report: IndexBuildReport,
}

impl QuestionIndex {
  /// Builds the index over `questions`, reusing the cache when its fingerprint matches.
  ///
  /// On a cache miss the index is rebuilt and written back. A failed write is
  /// logged and reported through `IndexBuildReport::cache_written`.
  pub fn build(questions: Vec<JsonValue>, cache: Option<IndexCache>, fuzzy: FuzzyOptions) -> Self {
    let mut report = IndexBuildReport::default();
    let mut records = Vec::with_capacity(questions.len());
    let mut id_lookup = HashMap::new();
    let mut ordered_ids = Vec::new();

    for question in questions {
      report.record_total();
      let record = QuestionRecord::from_value(question);

      match &record.id {
        None => report.record_without_id(),
        Some(id) if id_lookup.contains_key(id) => {
          debug!(id = %id, "Skipping duplicate question id");
          report.record_duplicate();
        }
        Some(id) => {
          id_lookup.insert(id.clone(), records.len());
          ordered_ids.push(id.clone());
          report.record_indexed();
        }
      }
      records.push(record);
    }

    let fingerprint = Fingerprint::compute(&ordered_ids);

    let mut this = Self {
      records,
      id_lookup,
      ordered_ids,
      index: InvertedIndex::new(),
      filter_values: FilterValues::default(),
      fingerprint,
      cache,
      fuzzy,
      report,
    };

    let cached = this.cache.as_ref().and_then(|cache| cache.load(&this.fingerprint));
    match cached {
      Some((index, filter_values)) => {
        this.index = index;
        this.filter_values = filter_values;
        this.report.source = IndexSource::Cache;
      }
      None => {
        this.index = InvertedIndex::build(this.indexed_records());
        this.filter_values = collect_filter_values(this.indexed_records().map(|(_, record)| record));
        this.report.source = IndexSource::Rebuilt;
        this.report.cache_written = match this.persist() {
          Ok(written) => written,
          Err(e) => {
            warn!(error = %e, "Failed to write index cache; continuing without it");
            false
          }
        };
      }
    }

    info!(
      total = this.report.total_records,
      indexed = this.report.indexed,
      skipped_without_id = this.report.skipped_without_id,
      skipped_duplicates = this.report.skipped_duplicates,
      all_indexed = this.report.is_all_indexed(),
      source = ?this.report.source,
      tokens = this.index.token_count(),
      tags = this.index.tag_count(),
      "Question index ready"
    );
    this
  }

  /// Loads every question file in `dir` and builds the index over them.
  ///
  /// # Errors
  /// - the directory cannot be enumerated
  pub fn from_directory(
    dir: &Path,
    cache: Option<IndexCache>,
    fuzzy: FuzzyOptions,
  ) -> Result<Self, CorpusError> {
    let questions = load_questions(dir)?;
    Ok(Self::build(questions, cache, fuzzy))
  }

  /// Runs a query and returns the requested page plus the total match count.
  pub fn search(&self, query: &SearchQuery) -> SearchPage {
    let normalized = query.normalize();
    let matches = evaluate(&self.index, &self.ordered_ids, &normalized, &self.fuzzy);
    let total = matches.len();

    let items = matches
      .into_iter()
      .skip(query.offset())
      .take(query.limit().unwrap_or(usize::MAX))
      .filter_map(|id| self.get(id).cloned())
      .collect();

    SearchPage { items, total }
  }

  /// Sorted, distinct facet values.
  pub fn filter_values(&self) -> FilterValues {
    self.filter_values.sorted_unique()
  }

  /// Every ingested payload in ingestion order, including unindexed ones.
  pub fn all(&self) -> Vec<JsonValue> {
    self.records.iter().map(|record| record.raw.clone()).collect()
  }

  /// Payload of an indexed question.
  pub fn get(&self, id: &str) -> Option<&JsonValue> {
    let position = *self.id_lookup.get(id)?;
    self.records.get(position).map(|record| &record.raw)
  }

  /// Adds one question and rewrites the cache.
  ///
  /// Questions without an ID, or with an ID already indexed, are stored but not
  /// indexed; the cache is left untouched for them.
  ///
  /// # Errors
  /// Returns the cache write failure. The in-memory update has already been
  /// applied at that point, so the question stays searchable.
  pub fn add(&mut self, question: JsonValue) -> Result<AddOutcome, CacheError> {
    let record = QuestionRecord::from_value(question);

    let id = match record.id.clone() {
      None => {
        self.records.push(record);
        return Ok(AddOutcome::Unindexed);
      }
      Some(id) if self.id_lookup.contains_key(&id) => {
        debug!(id = %id, "Question id already indexed");
        self.records.push(record);
        return Ok(AddOutcome::Duplicate);
      }
      Some(id) => id,
    };

    self.index.insert_record(&id, &record);
    append_record_facets(&mut self.filter_values, &record);
    self.id_lookup.insert(id.clone(), self.records.len());
    self.ordered_ids.push(id.clone());
    self.records.push(record);
    self.fingerprint = Fingerprint::compute(&self.ordered_ids);

    debug!(id = %id, indexed = self.ordered_ids.len(), "Question added");
    self.persist()?;
    Ok(AddOutcome::Indexed)
  }

  /// Number of ingested records (indexed or not)
  pub fn len(&self) -> usize {
    self.records.len()
  }

  /// Whether no record has been ingested
  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  /// Number of indexed (searchable) questions
  pub fn indexed_len(&self) -> usize {
    self.ordered_ids.len()
  }

  /// Indexed IDs in corpus order
  pub fn ordered_ids(&self) -> &[String] {
    &self.ordered_ids
  }

  /// Current corpus fingerprint
  pub fn fingerprint(&self) -> &Fingerprint {
    &self.fingerprint
  }

  /// Posting maps
  pub fn inverted_index(&self) -> &InvertedIndex {
    &self.index
  }

  /// Summary of the initial build
  pub fn report(&self) -> &IndexBuildReport {
    &self.report
  }

  /// `(id, record)` of every indexed question, in corpus order
  fn indexed_records(&self) -> impl Iterator<Item = (&str, &QuestionRecord)> {
    self.ordered_ids.iter().filter_map(|id| {
      let position = *self.id_lookup.get(id)?;
      self.records.get(position).map(|record| (id.as_str(), record))
    })
  }

  /// Writes the current index to the cache. Returns `false` when persistence is disabled.
  fn persist(&self) -> Result<bool, CacheError> {
    let Some(cache) = &self.cache else {
      return Ok(false);
    };
    cache.save(&self.fingerprint, &self.index, &self.filter_values)?;
    Ok(true)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;
  use tempfile::TempDir;

  fn corpus() -> Vec<JsonValue> {
    vec![
      json!({"id": "q1", "stem": "Pulmonary embolism", "tags": ["Vascular"],
             "metadata": {"subject": "Pathology", "difficulty": "hard"}}),
      json!({"id": "q2", "stem": "Aortic stenosis", "tags": ["Cardio"],
             "metadata": {"subject": "Physiology"}}),
      json!({"stem": "no id here"}),
      json!({"id": "q1", "stem": "duplicate of q1"}),
      json!({"id": "q3", "stem": "Pulmonary hypertension", "tags": ["Vascular"],
             "metadata": {"subject": "Pathology"}}),
    ]
  }

  fn ids(page: &SearchPage) -> Vec<&str> {
    page.items.iter().filter_map(|item| item["id"].as_str()).collect()
  }

  // ─── build ───

  #[test]
  fn build_reports_skipped_records() {
    let index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());
    let report = index.report();

    assert_eq!(report.total_records, 5);
    assert_eq!(report.indexed, 3);
    assert_eq!(report.skipped_without_id, 1);
    assert_eq!(report.skipped_duplicates, 1);
    assert_eq!(report.source, IndexSource::Rebuilt);
    assert!(!report.cache_written);

    assert_eq!(index.len(), 5);
    assert_eq!(index.indexed_len(), 3);
    assert_eq!(index.ordered_ids(), ["q1", "q2", "q3"]);
  }

  #[test]
  fn first_duplicate_wins() {
    let index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());

    assert_eq!(index.get("q1").unwrap()["stem"], json!("Pulmonary embolism"));
    assert!(index.search(&SearchQuery::new().with_query("duplicate")).items.is_empty());
  }

  #[test]
  fn all_includes_unindexed_records() {
    let index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());
    assert_eq!(index.all(), corpus());
  }

  #[test]
  fn empty_corpus() {
    let index = QuestionIndex::build(Vec::new(), None, FuzzyOptions::default());

    assert!(index.is_empty());
    let page = index.search(&SearchQuery::new().with_query("anything"));
    assert_eq!(page.total, 0);
    assert_eq!(index.filter_values(), FilterValues::default());
  }

  // ─── search ───

  #[test]
  fn search_paginates_in_corpus_order() {
    let index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());

    let page = index.search(&SearchQuery::new().with_limit(2));
    assert_eq!(page.total, 3);
    assert_eq!(ids(&page), vec!["q1", "q2"]);

    let page = index.search(&SearchQuery::new().with_limit(2).with_offset(2));
    assert_eq!(page.total, 3);
    assert_eq!(ids(&page), vec!["q3"]);
  }

  #[test]
  fn offset_past_end_keeps_total() {
    let index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());

    let page = index.search(&SearchQuery::new().with_query("pulmonary").with_offset(10));
    assert_eq!(page.total, 2);
    assert!(page.items.is_empty());
  }

  #[test]
  fn zero_limit_returns_total_only() {
    let index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());

    let page = index.search(&SearchQuery::new().with_limit(0));
    assert_eq!(page.total, 3);
    assert!(page.items.is_empty());
  }

  #[test]
  fn filter_values_are_sorted_and_distinct() {
    let index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());
    let values = index.filter_values();

    assert_eq!(values.subjects, vec!["Pathology", "Physiology"]);
    assert_eq!(values.difficulties, vec!["hard"]);
    assert_eq!(values.tags, vec!["Cardio", "Vascular"]);
  }

  // ─── add ───

  #[test]
  fn add_makes_question_searchable() {
    let mut index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());
    let before = index.fingerprint().clone();

    let outcome = index
      .add(json!({"id": "q4", "stem": "Renal failure", "tags": ["Renal"],
                  "metadata": {"subject": "Pathology", "system": "Renal"}}))
      .unwrap();

    assert_eq!(outcome, AddOutcome::Indexed);
    assert_eq!(ids(&index.search(&SearchQuery::new().with_query("renal"))), vec!["q4"]);
    assert_eq!(index.ordered_ids().last().map(String::as_str), Some("q4"));
    assert_ne!(index.fingerprint(), &before);
    assert_eq!(index.fingerprint().record_count, 4);
    assert_eq!(index.filter_values().systems, vec!["Renal"]);
    // "Pathology" was appended again but reads back once
    assert_eq!(index.filter_values().subjects, vec!["Pathology", "Physiology"]);
  }

  #[test]
  fn add_without_id_is_unindexed() {
    let mut index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());

    let outcome = index.add(json!({"stem": "orphan question"})).unwrap();

    assert_eq!(outcome, AddOutcome::Unindexed);
    assert_eq!(index.len(), 6);
    assert_eq!(index.indexed_len(), 3);
    assert!(index.search(&SearchQuery::new().with_query("orphan")).items.is_empty());
  }

  #[test]
  fn add_duplicate_keeps_first() {
    let mut index = QuestionIndex::build(corpus(), None, FuzzyOptions::default());
    let before = index.fingerprint().clone();

    let outcome = index.add(json!({"id": "q2", "stem": "replacement"})).unwrap();

    assert_eq!(outcome, AddOutcome::Duplicate);
    assert_eq!(index.get("q2").unwrap()["stem"], json!("Aortic stenosis"));
    assert_eq!(index.fingerprint(), &before);
  }

  #[test]
  fn add_matches_full_rebuild() {
    let mut incremental = QuestionIndex::build(corpus(), None, FuzzyOptions::default());
    let extra = json!({"id": "q9", "stem": "Nephrotic syndrome", "tags": ["Renal"]});
    incremental.add(extra.clone()).unwrap();

    let mut questions = corpus();
    questions.push(extra);
    let rebuilt = QuestionIndex::build(questions, None, FuzzyOptions::default());

    assert_eq!(incremental.inverted_index(), rebuilt.inverted_index());
    assert_eq!(incremental.fingerprint(), rebuilt.fingerprint());
    assert_eq!(incremental.filter_values(), rebuilt.filter_values());
  }

  // ─── cache ───

  #[test]
  fn second_build_is_served_from_cache() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");

    let first = QuestionIndex::build(corpus(), Some(IndexCache::new(&path)), FuzzyOptions::default());
    assert!(first.report().cache_written);
    assert_eq!(first.report().source, IndexSource::Rebuilt);

    let second = QuestionIndex::build(corpus(), Some(IndexCache::new(&path)), FuzzyOptions::default());
    assert_eq!(second.report().source, IndexSource::Cache);
    assert!(!second.report().cache_written);
    assert_eq!(second.inverted_index(), first.inverted_index());
    assert_eq!(second.filter_values(), first.filter_values());
  }

  #[test]
  fn add_persists_cache_for_next_start() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    let extra = json!({"id": "q4", "stem": "Renal failure"});

    let mut index = QuestionIndex::build(corpus(), Some(IndexCache::new(&path)), FuzzyOptions::default());
    index.add(extra.clone()).unwrap();

    let mut questions = corpus();
    questions.push(extra);
    let restarted = QuestionIndex::build(questions, Some(IndexCache::new(&path)), FuzzyOptions::default());

    assert_eq!(restarted.report().source, IndexSource::Cache);
    assert_eq!(restarted.inverted_index(), index.inverted_index());
  }

  #[test]
  fn unwritable_cache_does_not_fail_build() {
    let tmp = TempDir::new().unwrap();
    // a directory where the cache file should be
    let path = tmp.path().join("index.json");
    std::fs::create_dir(&path).unwrap();

    let index = QuestionIndex::build(corpus(), Some(IndexCache::new(&path)), FuzzyOptions::default());

    assert!(!index.report().cache_written);
    assert_eq!(index.indexed_len(), 3);
  }

  #[test]
  fn add_reports_cache_write_failure_after_applying() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    std::fs::create_dir(&path).unwrap();
    let mut index = QuestionIndex::build(corpus(), Some(IndexCache::new(&path)), FuzzyOptions::default());

    let result = index.add(json!({"id": "q4", "stem": "Renal failure"}));

    assert!(result.is_err());
    assert!(index.get("q4").is_some());
  }

  #[test]
  fn from_directory_loads_corpus() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(
      tmp.path().join("questions.json"),
      serde_json::to_string(&corpus()).unwrap(),
    )
    .unwrap();

    let index = QuestionIndex::from_directory(tmp.path(), None, FuzzyOptions::default()).unwrap();

    assert_eq!(index.len(), 5);
    assert_eq!(index.indexed_len(), 3);
  }
}
