//! Data Model Definition
use serde_json::Value as JsonValue;
use std::collections::{HashMap, HashSet};

use crate::tokenizer::{iter_strings, normalize_scalar, normalize_str, tokenize};

/// Key of the question ID in a raw payload.
pub const ID_KEY: &str = "id";

/// Key of the tag list in a raw payload.
pub const TAGS_KEY: &str = "tags";

/// Key of the metadata mapping in a raw payload.
pub const METADATA_KEY: &str = "metadata";

/// Normalized metadata field name → normalized values found under that field
pub type MetadataIndex = HashMap<String, HashSet<String>>;

/// Searchable view of one question payload.
///
/// Built once from the raw JSON and never modified afterwards. Extraction is
/// best-effort: absent or wrong-typed fields simply contribute nothing.
#[derive(Debug, Clone)]
pub struct QuestionRecord {
  /// Question ID, if one could be derived from the payload
  pub id: Option<String>,

  /// Original payload, returned as-is in search results
  pub raw: JsonValue,

  /// Lowercase word tokens from every searchable field
  pub search_tokens: HashSet<String>,

  /// Normalized tags
  pub tags: HashSet<String>,

  /// Normalized metadata values per lowercased field name
  pub metadata_index: MetadataIndex,
}

impl QuestionRecord {
  /// Builds a record from a raw question payload.
  ///
  /// Token sources: `id`, `stem`, `choices[].label`/`choices[].text`,
  /// `explanation.summary`, `explanation.rationales[].text`/`.choice`,
  /// `tags[]`, every string leaf under `metadata`, and `answer`.
  pub fn from_value(raw: JsonValue) -> Self {
    let mut search_tokens = HashSet::new();
    let mut tags = HashSet::new();
    let mut metadata_index = MetadataIndex::new();

    let id = raw.get(ID_KEY).and_then(question_id);
    if let Some(id) = &id {
      search_tokens.extend(tokenize(id));
    }

    add_text(&mut search_tokens, raw.get("stem"));

    if let Some(choices) = raw.get("choices").and_then(JsonValue::as_array) {
      for choice in choices {
        add_text(&mut search_tokens, choice.get("label"));
        add_text(&mut search_tokens, choice.get("text"));
      }
    }

    if let Some(explanation) = raw.get("explanation") {
      add_text(&mut search_tokens, explanation.get("summary"));

      if let Some(rationales) = explanation.get("rationales").and_then(JsonValue::as_array) {
        for rationale in rationales {
          add_text(&mut search_tokens, rationale.get("text"));
          add_text(&mut search_tokens, rationale.get("choice"));
        }
      }
    }

    if let Some(raw_tags) = raw.get(TAGS_KEY).and_then(JsonValue::as_array) {
      for tag in raw_tags {
        let Some(text) = scalar_text(tag) else {
          continue;
        };
        let normalized = normalize_str(&text);
        if normalized.is_empty() {
          continue;
        }
        search_tokens.extend(tokenize(&text));
        search_tokens.insert(normalized.clone());
        tags.insert(normalized);
      }
    }

    if let Some(metadata) = raw.get(METADATA_KEY).and_then(JsonValue::as_object) {
      for (field, value) in metadata {
        let field = normalize_str(field);
        for leaf in iter_strings(value) {
          let normalized = normalize_str(&leaf);
          if normalized.is_empty() {
            continue;
          }
          search_tokens.extend(tokenize(&leaf));
          search_tokens.insert(normalized.clone());
          metadata_index.entry(field.clone()).or_default().insert(normalized);
        }
      }
    }

    add_text(&mut search_tokens, raw.get("answer"));

    Self {
      id,
      raw,
      search_tokens,
      tags,
      metadata_index,
    }
  }

  /// Raw `metadata.<field>` value if it is a string (facet seed values).
  pub fn raw_metadata_str(&self, field: &str) -> Option<&str> {
    self.raw.get(METADATA_KEY)?.get(field)?.as_str()
  }

  /// Raw string tags, in payload order and without normalization.
  pub fn raw_tags(&self) -> impl Iterator<Item = &str> {
    self
      .raw
      .get(TAGS_KEY)
      .and_then(JsonValue::as_array)
      .into_iter()
      .flatten()
      .filter_map(JsonValue::as_str)
  }
}

/// Derives the lookup ID of a payload.
///
/// - non-blank strings are kept verbatim
/// - numbers and booleans are coerced through `normalize_scalar`
/// - anything else has no usable ID
pub fn question_id(value: &JsonValue) -> Option<String> {
  match value {
    JsonValue::String(s) if !s.trim().is_empty() => Some(s.clone()),
    JsonValue::Number(_) | JsonValue::Bool(_) => Some(normalize_scalar(value)),
    _ => None,
  }
}

/// Text of a scalar value (string, number, bool); `None` for null and compound values
fn scalar_text(value: &JsonValue) -> Option<String> {
  match value {
    JsonValue::String(s) => Some(s.clone()),
    JsonValue::Number(n) => Some(n.to_string()),
    JsonValue::Bool(b) => Some(b.to_string()),
    _ => None,
  }
}

/// Folds the word tokens of a scalar field into `tokens`
fn add_text(tokens: &mut HashSet<String>, value: Option<&JsonValue>) {
  if let Some(text) = value.and_then(scalar_text) {
    tokens.extend(tokenize(&text));
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────
