//! Corpus fingerprint used to validate a persisted cache.

use serde::{Deserialize, Serialize};

/// Cache format version. Bump whenever the document layout changes.
pub const CACHE_VERSION: u32 = 1;

/// Identity of an indexed corpus.
///
/// Field order is alphabetical so the serialized form has sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fingerprint {
  /// Indexed question IDs, sorted
  pub question_ids: Vec<String>,
  /// Number of indexed questions
  pub record_count: usize,
  /// Cache format version
  pub version: u32,
}

impl Fingerprint {
  /// Computes the fingerprint of an ordered ID list.
  ///
  /// Reordering the corpus does not change the fingerprint; adding, removing or
  /// renaming a question does.
  pub fn compute<S: AsRef<str>>(ordered_ids: &[S]) -> Self {
    let mut question_ids: Vec<String> =
      ordered_ids.iter().map(|id| id.as_ref().to_string()).collect();
    question_ids.sort();

    Self {
      question_ids,
      record_count: ordered_ids.len(),
      version: CACHE_VERSION,
    }
  }
}
