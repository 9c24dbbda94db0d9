//! Boolean query evaluation over the inverted index.
//!
//! Matching is purely boolean. Results come back in corpus order, never ranked.

use std::collections::HashSet;

use tracing::debug;

use crate::fuzzy::get_close_matches;
use crate::indexer::InvertedIndex;
use crate::searcher::query::NormalizedQuery;

/// Default minimum similarity for a fuzzy token match
const DEFAULT_FUZZY_CUTOFF: f64 = 0.75;

/// Default number of fuzzy candidates per query token
const DEFAULT_FUZZY_MAX_MATCHES: usize = 5;

/// Fuzzy token expansion parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyOptions {
  /// Minimum similarity in `[0.0, 1.0]`
  pub cutoff: f64,
  /// Maximum number of close matches per query token
  pub max_matches: usize,
}

impl Default for FuzzyOptions {
  fn default() -> Self {
    Self {
      cutoff: DEFAULT_FUZZY_CUTOFF,
      max_matches: DEFAULT_FUZZY_MAX_MATCHES,
    }
  }
}

/// Evaluates `query` and returns the matching IDs in corpus order.
///
/// # Arguments
/// - `index`: inverted index to evaluate against
/// - `ordered_ids`: every indexed ID, in corpus order
/// - `query`: normalized query
/// - `fuzzy`: fuzzy expansion parameters
///
/// # Semantics
/// - query tokens: AND across tokens, each token expanded to exact, substring and
///   fuzzy matches (OR within the expansion)
/// - tags: AND
/// - metadata: OR within a field, AND across fields
///
/// A token with an empty expansion, an unknown tag or an unknown metadata field
/// short-circuits to no matches.
pub fn evaluate<'a>(
  index: &InvertedIndex,
  ordered_ids: &'a [String],
  query: &NormalizedQuery,
  fuzzy: &FuzzyOptions,
) -> Vec<&'a str> {
  if query.is_unconstrained() {
    debug!(total = ordered_ids.len(), "Unconstrained query");
    return ordered_ids.iter().map(String::as_str).collect();
  }

  // None = every ID is still a candidate
  let mut candidates: Option<HashSet<&str>> = None;

  for token in &query.tokens {
    let expansion = expand_token(index, token, fuzzy);
    debug!(token = %token, expanded = expansion.len(), "Expanded query token");

    let ids = union_postings(expansion.iter().filter_map(|t| index.token_postings(t)));
    if !narrow(&mut candidates, ids) {
      return Vec::new();
    }
  }

  for tag in &query.tags {
    let Some(postings) = index.tag_postings(tag) else {
      debug!(tag = %tag, "Unknown tag");
      return Vec::new();
    };
    if !narrow(&mut candidates, postings.iter().map(String::as_str).collect()) {
      return Vec::new();
    }
  }

  for (field, allowed) in &query.metadata {
    let Some(values) = index.metadata_field(field) else {
      debug!(field = %field, "Unknown metadata field");
      return Vec::new();
    };
    let ids = union_postings(allowed.iter().filter_map(|value| values.get(value)));
    if !narrow(&mut candidates, ids) {
      return Vec::new();
    }
  }

  let matches: Vec<&'a str> = match &candidates {
    None => ordered_ids.iter().map(String::as_str).collect(),
    Some(set) => ordered_ids
      .iter()
      .map(String::as_str)
      .filter(|id| set.contains(id))
      .collect(),
  };

  debug!(
    tokens = query.tokens.len(),
    tags = query.tags.len(),
    fields = query.metadata.len(),
    total = matches.len(),
    "Evaluated query"
  );
  matches
}

/// Indexed tokens a query token stands for.
///
/// 1. the token itself, when indexed
/// 2. every indexed token containing it
/// 3. up to `max_matches` close matches at `cutoff`
fn expand_token<'i>(index: &'i InvertedIndex, token: &str, fuzzy: &FuzzyOptions) -> HashSet<&'i str> {
  let mut expansion: HashSet<&'i str> = index
    .vocabulary()
    .filter(|candidate| candidate.contains(token))
    .collect();

  expansion.extend(get_close_matches(
    token,
    index.vocabulary(),
    fuzzy.max_matches,
    fuzzy.cutoff,
  ));

  expansion
}

/// Union of several posting sets
fn union_postings<'i, I>(postings: I) -> HashSet<&'i str>
where
  I: IntoIterator<Item = &'i HashSet<String>>,
{
  postings.into_iter().flatten().map(String::as_str).collect()
}

/// Intersects the running candidate set with `ids`.
///
/// Returns `false` once nothing is left.
fn narrow<'i>(candidates: &mut Option<HashSet<&'i str>>, ids: HashSet<&'i str>) -> bool {
  let next = match candidates.take() {
    None => ids,
    Some(current) => current.intersection(&ids).copied().collect(),
  };
  let alive = !next.is_empty();
  *candidates = Some(next);
  alive
}
