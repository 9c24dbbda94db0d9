//! crates/qbank-search/tests/integration_test.rs
//!
//! End-to-end query semantics.
//! Builds indexes over in-memory corpora and checks token, tag, metadata and
//! pagination behaviour through the public API.

use serde_json::{Value, json};

use qbank_search::indexer::QuestionIndex;
use qbank_search::searcher::{FuzzyOptions, SearchPage, SearchQuery};

/// Two-question corpus used by the concrete scenario.
fn scenario_corpus() -> Vec<Value> {
  vec![
    json!({
      "id": "q_1a2b3c4d",
      "stem": "A 58-year-old man with pulmonary embolism presents with pleuritic chest pain.",
      "tags": ["vascular", "high-yield"]
    }),
    json!({
      "id": "q_5e6f7a8b",
      "stem": "A child with streptococcal infection develops a rash.",
      "tags": ["infection"],
      "metadata": {"subject": "Microbiology"}
    }),
  ]
}

/// Larger corpus with overlapping tags and metadata.
fn clinical_corpus() -> Vec<Value> {
  vec![
    json!({"id": "c1", "stem": "Myocardial infarction with ST elevation",
           "tags": ["cardio", "high-yield"],
           "metadata": {"subject": "Pathology", "system": "Cardiovascular"}}),
    json!({"id": "c2", "stem": "Asthma exacerbation in a child",
           "tags": ["pulm"],
           "metadata": {"subject": "Pathology", "system": "Respiratory"}}),
    json!({"id": "c3", "stem": "Renal clearance of inulin",
           "tags": ["renal", "high-yield"],
           "metadata": {"subject": "Physiology", "system": "Renal"}}),
    json!({"id": "c4", "stem": "Cardiac output during exercise",
           "tags": ["cardio"],
           "metadata": {"subject": "Physiology", "system": "Cardiovascular"}}),
    json!({"id": "c5", "stem": "Glomerulonephritis after infection",
           "tags": ["renal"],
           "metadata": {"subject": "Pathology", "system": "Renal"}}),
    json!({"id": "c6", "stem": "Pulmonary fibrosis and restrictive disease",
           "tags": ["pulm", "high-yield"],
           "metadata": {"subject": "Pathology", "system": ["Respiratory", "Cardiovascular"]}}),
  ]
}

fn build(corpus: Vec<Value>) -> QuestionIndex {
  QuestionIndex::build(corpus, None, FuzzyOptions::default())
}

fn ids(page: &SearchPage) -> Vec<String> {
  page.items.iter().filter_map(|item| item["id"].as_str()).map(str::to_string).collect()
}

fn search_ids(index: &QuestionIndex, query: SearchQuery) -> Vec<String> {
  ids(&index.search(&query))
}

// ─── Concrete scenario ───

#[test]
fn scenario_query_tag_and_metadata() {
  let index = build(scenario_corpus());

  assert_eq!(search_ids(&index, SearchQuery::new().with_query("embolism")), vec!["q_1a2b3c4d"]);
  assert_eq!(search_ids(&index, SearchQuery::new().with_tags(["infection"])), vec!["q_5e6f7a8b"]);
  assert_eq!(
    search_ids(&index, SearchQuery::new().with_query("embolism").with_tags(["vascular"])),
    vec!["q_1a2b3c4d"]
  );
  assert!(search_ids(&index, SearchQuery::new().with_query("embolism").with_tags(["infection"])).is_empty());
  assert_eq!(
    search_ids(&index, SearchQuery::new().with_metadata_filter("subject", "Microbiology")),
    vec!["q_5e6f7a8b"]
  );
}

// ─── Idempotent rebuild ───

#[test]
fn rebuilding_produces_identical_index() {
  let a = build(clinical_corpus());
  let b = build(clinical_corpus());

  assert_eq!(a.inverted_index(), b.inverted_index());
  assert_eq!(a.filter_values(), b.filter_values());
  assert_eq!(a.fingerprint(), b.fingerprint());
}

// ─── Token AND semantics ───

#[test]
fn words_matching_disjoint_records_return_nothing() {
  let index = build(clinical_corpus());

  // each word alone matches a different record
  assert_eq!(search_ids(&index, SearchQuery::new().with_query("asthma")), vec!["c2"]);
  assert_eq!(search_ids(&index, SearchQuery::new().with_query("inulin")), vec!["c3"]);
  assert!(search_ids(&index, SearchQuery::new().with_query("asthma inulin")).is_empty());
}

#[test]
fn every_word_must_match() {
  let index = build(clinical_corpus());

  assert_eq!(search_ids(&index, SearchQuery::new().with_query("renal")), vec!["c3", "c5"]);
  assert_eq!(search_ids(&index, SearchQuery::new().with_query("renal inulin")), vec!["c3"]);
}

#[test]
fn fuzzy_query_matches_misspelling() {
  let index = build(vec![
    json!({"id": "e1", "stem": "Saddle embolism in the pulmonary artery"}),
    json!({"id": "e2", "stem": "Septic arthritis"}),
  ]);

  assert_eq!(search_ids(&index, SearchQuery::new().with_query("embolsm")), vec!["e1"]);
}

#[test]
fn prefix_of_a_token_matches() {
  let index = build(clinical_corpus());

  assert_eq!(search_ids(&index, SearchQuery::new().with_query("glomerulo")), vec!["c5"]);
}

// ─── Tag AND semantics ───

#[test]
fn every_tag_must_be_present() {
  let index = build(clinical_corpus());

  assert_eq!(search_ids(&index, SearchQuery::new().with_tags(["cardio"])), vec!["c1", "c4"]);
  assert_eq!(
    search_ids(&index, SearchQuery::new().with_tags(["cardio", "high-yield"])),
    vec!["c1"]
  );
  assert!(search_ids(&index, SearchQuery::new().with_tags(["cardio", "renal"])).is_empty());
}

#[test]
fn tags_match_case_insensitively() {
  let index = build(clinical_corpus());

  assert_eq!(search_ids(&index, SearchQuery::new().with_tags([" PULM "])), vec!["c2", "c6"]);
}

// ─── Metadata field AND / value OR ───

#[test]
fn metadata_and_across_fields_or_within() {
  let index = build(clinical_corpus());

  let query = SearchQuery::new()
    .with_metadata_filter("subject", "Pathology")
    .with_metadata_filter("system", json!(["Cardiovascular", "Respiratory"]));

  assert_eq!(search_ids(&index, query), vec!["c1", "c2", "c6"]);
}

#[test]
fn metadata_object_filter_uses_its_values() {
  let index = build(clinical_corpus());

  let query = SearchQuery::new().with_metadata_filter("system", json!({"a": "Renal", "b": "Respiratory"}));

  assert_eq!(search_ids(&index, query), vec!["c2", "c3", "c5", "c6"]);
}

// ─── Pagination ───

#[test]
fn total_is_independent_of_paging() {
  let index = build(clinical_corpus());
  let base = SearchQuery::new().with_metadata_filter("subject", "Pathology");
  let total = index.search(&base).total;
  assert_eq!(total, 4);

  for limit in [0, 1, 2, 3, 10] {
    for offset in [0, 1, 3, 4, 7] {
      let page = index.search(&base.clone().with_limit(limit).with_offset(offset));
      assert_eq!(page.total, total);
      assert_eq!(page.items.len(), limit.min(total.saturating_sub(offset)));
    }
  }
}

#[test]
fn pages_concatenate_to_full_result() {
  let index = build(clinical_corpus());
  let full = search_ids(&index, SearchQuery::new());

  let mut paged = Vec::new();
  for offset in (0..full.len()).step_by(4) {
    paged.extend(search_ids(&index, SearchQuery::new().with_limit(4).with_offset(offset)));
  }

  assert_eq!(paged, full);
}

// ─── Corpus order ───

#[test]
fn results_follow_corpus_order_and_are_stable() {
  let index = build(clinical_corpus());
  let query = SearchQuery::new().with_tags(["high-yield"]);

  let first = search_ids(&index, query.clone());
  let second = search_ids(&index, query);

  assert_eq!(first, vec!["c1", "c3", "c6"]);
  assert_eq!(first, second);
}

#[test]
fn empty_query_returns_whole_corpus() {
  let index = build(clinical_corpus());

  let page = index.search(&SearchQuery::new());

  assert_eq!(page.total, 6);
  assert_eq!(ids(&page), vec!["c1", "c2", "c3", "c4", "c5", "c6"]);
}

// ─── Incremental add ───

#[test]
fn added_question_is_appended_in_corpus_order() {
  let mut index = build(clinical_corpus());

  index
    .add(json!({"id": "c0", "stem": "Renal artery stenosis", "tags": ["renal"]}))
    .unwrap();

  assert_eq!(search_ids(&index, SearchQuery::new().with_tags(["renal"])), vec!["c3", "c5", "c0"]);
}
