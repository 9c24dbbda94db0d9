//! On-disk index cache.
//!
//! The document is plain JSON with sorted keys and sorted posting lists, so two
//! builds of the same corpus produce byte-identical files.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::cache::fingerprint::{CACHE_VERSION, Fingerprint};
use crate::errors::CacheError;
use crate::indexer::InvertedIndex;
use crate::models::FilterValues;

/// key → sorted question IDs
type SortedPostings = BTreeMap<String, Vec<String>>;

/// Serialized form of the index.
///
/// Field order is alphabetical so the pretty-printed document has sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheDocument {
  /// Facet values (sorted, distinct)
  pub filters: FilterValues,
  /// Fingerprint of the indexed corpus
  pub fingerprint: Fingerprint,
  /// field → value → IDs
  pub metadata: BTreeMap<String, SortedPostings>,
  /// tag → IDs
  pub tags: SortedPostings,
  /// token → IDs
  pub tokens: SortedPostings,
  /// Document format version
  pub version: u32,
}

impl CacheDocument {
  /// Snapshots an index into its serializable form.
  pub fn from_index(fingerprint: &Fingerprint, index: &InvertedIndex, filters: &FilterValues) -> Self {
    Self {
      filters: filters.sorted_unique(),
      fingerprint: fingerprint.clone(),
      metadata: index
        .metadata
        .iter()
        .map(|(field, values)| (field.clone(), sort_postings(values)))
        .collect(),
      tags: sort_postings(&index.tags),
      tokens: sort_postings(&index.tokens),
      version: CACHE_VERSION,
    }
  }

  /// Restores the in-memory index and facet values.
  pub fn into_index(self) -> (InvertedIndex, FilterValues) {
    let index = InvertedIndex {
      tokens: unsort_postings(self.tokens),
      tags: unsort_postings(self.tags),
      metadata: self
        .metadata
        .into_iter()
        .map(|(field, values)| (field, unsort_postings(values)))
        .collect(),
    };
    (index, self.filters)
  }
}

fn sort_postings(postings: &HashMap<String, HashSet<String>>) -> SortedPostings {
  postings
    .iter()
    .map(|(key, ids)| {
      let mut ids: Vec<String> = ids.iter().cloned().collect();
      ids.sort();
      (key.clone(), ids)
    })
    .collect()
}

fn unsort_postings(postings: SortedPostings) -> HashMap<String, HashSet<String>> {
  postings.into_iter().map(|(key, ids)| (key, ids.into_iter().collect())).collect()
}

/// Handle to the cache file at a fixed path.
#[derive(Debug, Clone)]
pub struct IndexCache {
  path: PathBuf,
}

impl IndexCache {
  /// Creates a handle; nothing is touched on disk until `load` or `save`.
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }

  /// Path of the cache file
  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Loads the cached index if it was built for `expected`.
  ///
  /// Any problem (missing file, unreadable file, bad JSON, other version,
  /// other fingerprint) yields `None` and the caller rebuilds.
  pub fn load(&self, expected: &Fingerprint) -> Option<(InvertedIndex, FilterValues)> {
    let text = match std::fs::read_to_string(&self.path) {
      Ok(text) => text,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        debug!(path = %self.path.display(), "No index cache on disk");
        return None;
      }
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "Failed to read index cache; rebuilding");
        return None;
      }
    };

    let document: CacheDocument = match serde_json::from_str(&text) {
      Ok(document) => document,
      Err(e) => {
        warn!(path = %self.path.display(), error = %e, "Failed to decode index cache; rebuilding");
        return None;
      }
    };

    if document.version != CACHE_VERSION {
      debug!(
        found = document.version,
        expected = CACHE_VERSION,
        "Index cache version mismatch"
      );
      return None;
    }

    if &document.fingerprint != expected {
      debug!(
        cached_records = document.fingerprint.record_count,
        expected_records = expected.record_count,
        "Index cache fingerprint mismatch"
      );
      return None;
    }

    debug!(path = %self.path.display(), "Index cache hit");
    Some(document.into_index())
  }

  /// Writes the index to disk, replacing any previous file atomically.
  ///
  /// # Errors
  /// - the parent directory cannot be created
  /// - the document cannot be serialized or written
  /// - the temporary file cannot be renamed into place
  pub fn save(
    &self,
    fingerprint: &Fingerprint,
    index: &InvertedIndex,
    filters: &FilterValues,
  ) -> Result<(), CacheError> {
    let parent = match self.path.parent() {
      Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
      _ => PathBuf::from("."),
    };
    std::fs::create_dir_all(&parent).map_err(|e| CacheError::CreateDirFailed {
      path: parent.clone(),
      source: Arc::new(e),
    })?;

    let document = CacheDocument::from_index(fingerprint, index, filters);
    let bytes = serde_json::to_vec_pretty(&document)
      .map_err(|e| CacheError::Serialize { source: Arc::new(e) })?;

    let write_failed = |e: std::io::Error| CacheError::WriteFailed {
      path: self.path.clone(),
      source: Arc::new(e),
    };
    let mut tmp = NamedTempFile::new_in(&parent).map_err(write_failed)?;
    tmp.write_all(&bytes).map_err(write_failed)?;
    tmp.flush().map_err(write_failed)?;

    tmp.persist(&self.path).map_err(|e| CacheError::PersistFailed {
      path: self.path.clone(),
      source: Arc::new(e.error),
    })?;

    info!(
      path = %self.path.display(),
      records = fingerprint.record_count,
      tokens = document.tokens.len(),
      "Index cache written"
    );
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::QuestionRecord;
  use serde_json::json;
  use tempfile::TempDir;

  fn sample() -> (Fingerprint, InvertedIndex, FilterValues) {
    let a = QuestionRecord::from_value(json!({
      "id": "q2", "stem": "renal failure", "tags": ["Renal"],
      "metadata": {"subject": "Physiology"}
    }));
    let b = QuestionRecord::from_value(json!({
      "id": "q1", "stem": "heart failure", "tags": ["Cardio"],
      "metadata": {"subject": "Pathology"}
    }));

    let index = InvertedIndex::build([("q2", &a), ("q1", &b)]);
    let filters = FilterValues {
      subjects: vec!["Physiology".into(), "Pathology".into()],
      tags: vec!["Renal".into(), "Cardio".into()],
      ..Default::default()
    };
    (Fingerprint::compute(&["q2", "q1"]), index, filters)
  }

  // ─── save / load ───

  #[test]
  fn save_then_load_restores_index() {
    let tmp = TempDir::new().unwrap();
    let cache = IndexCache::new(tmp.path().join("index.json"));
    let (fingerprint, index, filters) = sample();

    cache.save(&fingerprint, &index, &filters).unwrap();
    let (loaded, loaded_filters) = cache.load(&fingerprint).unwrap();

    assert_eq!(loaded, index);
    assert_eq!(loaded_filters, filters.sorted_unique());
  }

  #[test]
  fn load_missing_file_is_none() {
    let tmp = TempDir::new().unwrap();
    let cache = IndexCache::new(tmp.path().join("absent.json"));
    let (fingerprint, _, _) = sample();

    assert!(cache.load(&fingerprint).is_none());
  }

  #[test]
  fn load_with_other_fingerprint_is_none() {
    let tmp = TempDir::new().unwrap();
    let cache = IndexCache::new(tmp.path().join("index.json"));
    let (fingerprint, index, filters) = sample();
    cache.save(&fingerprint, &index, &filters).unwrap();

    let grown = Fingerprint::compute(&["q1", "q2", "q3"]);
    assert!(cache.load(&grown).is_none());
  }

  #[test]
  fn load_corrupt_file_is_none() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    std::fs::write(&path, "{ not json").unwrap();
    let (fingerprint, _, _) = sample();

    assert!(IndexCache::new(&path).load(&fingerprint).is_none());
  }

  #[test]
  fn load_other_version_is_none() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    let cache = IndexCache::new(&path);
    let (fingerprint, index, filters) = sample();
    cache.save(&fingerprint, &index, &filters).unwrap();

    let mut document: serde_json::Value =
      serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    document["version"] = json!(CACHE_VERSION + 1);
    std::fs::write(&path, document.to_string()).unwrap();

    assert!(cache.load(&fingerprint).is_none());
  }

  #[test]
  fn save_creates_missing_parent_dirs() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("nested").join("deeper").join("index.json");
    let (fingerprint, index, filters) = sample();

    IndexCache::new(&path).save(&fingerprint, &index, &filters).unwrap();

    assert!(path.is_file());
  }

  #[test]
  fn save_overwrites_previous_file() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    std::fs::write(&path, "stale").unwrap();
    let (fingerprint, index, filters) = sample();

    let cache = IndexCache::new(&path);
    cache.save(&fingerprint, &index, &filters).unwrap();

    assert!(cache.load(&fingerprint).is_some());
    // no stray temp files left next to the cache
    assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 1);
  }

  // ─── document layout ───

  #[test]
  fn document_keys_and_postings_are_sorted() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("index.json");
    let (fingerprint, index, filters) = sample();
    IndexCache::new(&path).save(&fingerprint, &index, &filters).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();

    let keys: Vec<&String> = value.as_object().unwrap().keys().collect();
    assert_eq!(keys, vec!["filters", "fingerprint", "metadata", "tags", "tokens", "version"]);
    assert_eq!(value["version"], json!(1));
    assert_eq!(value["tokens"]["failure"], json!(["q1", "q2"]));
    assert_eq!(value["fingerprint"]["question_ids"], json!(["q1", "q2"]));
    assert_eq!(value["metadata"]["subject"]["pathology"], json!(["q1"]));
    assert_eq!(value["filters"]["subjects"], json!(["Pathology", "Physiology"]));
    // pretty-printed
    assert!(text.contains("\n  \"filters\""));
  }

  #[test]
  fn insertion_order_does_not_change_document() {
    let a = QuestionRecord::from_value(json!({"id": "q1", "stem": "alpha beta"}));
    let b = QuestionRecord::from_value(json!({"id": "q2", "stem": "beta gamma"}));
    let filters = FilterValues::default();

    let forward = InvertedIndex::build([("q1", &a), ("q2", &b)]);
    let backward = InvertedIndex::build([("q2", &b), ("q1", &a)]);
    let to_text = |index: &InvertedIndex, ids: &[&str]| {
      let document = CacheDocument::from_index(&Fingerprint::compute(ids), index, &filters);
      serde_json::to_string_pretty(&document).unwrap()
    };

    assert_eq!(to_text(&forward, &["q1", "q2"]), to_text(&backward, &["q2", "q1"]));
  }
}
