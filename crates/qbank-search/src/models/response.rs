//! Response Model Definition

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Search response: one page of raw question payloads plus pagination info
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
  /// Raw question payloads of the requested page, in corpus order
  pub data: Vec<JsonValue>,
  /// Pagination details
  pub pagination: Pagination,
}

/// Pagination block of a search response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
  /// Number of matches before slicing
  pub total: usize,
  /// Effective page size
  pub limit: usize,
  /// Requested offset
  pub offset: usize,
  /// Number of payloads in `data`
  pub returned: usize,
}

/// Facet values for UI filter pickers.
///
/// Values are the raw (non-normalized) strings seen in the corpus, sorted and distinct.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterValues {
  /// Distinct `metadata.difficulty` values
  #[serde(default)]
  pub difficulties: Vec<String>,
  /// Distinct `metadata.status` values
  #[serde(default)]
  pub statuses: Vec<String>,
  /// Distinct `metadata.subject` values
  #[serde(default)]
  pub subjects: Vec<String>,
  /// Distinct `metadata.system` values
  #[serde(default)]
  pub systems: Vec<String>,
  /// Distinct tags
  #[serde(default)]
  pub tags: Vec<String>,
}

impl FilterValues {
  /// Returns a copy with every list sorted and deduplicated.
  #[must_use]
  pub fn sorted_unique(&self) -> Self {
    fn dedup(values: &[String]) -> Vec<String> {
      values.iter().cloned().collect::<BTreeSet<_>>().into_iter().collect()
    }

    Self {
      difficulties: dedup(&self.difficulties),
      statuses: dedup(&self.statuses),
      subjects: dedup(&self.subjects),
      systems: dedup(&self.systems),
      tags: dedup(&self.tags),
    }
  }
}
