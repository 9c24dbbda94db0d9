//! Facet value collection for UI filter pickers.

use crate::models::{FilterValues, QuestionRecord};

/// Raw metadata fields surfaced as facets
const SUBJECT_FIELD: &str = "subject";
const SYSTEM_FIELD: &str = "system";
const STATUS_FIELD: &str = "status";
const DIFFICULTY_FIELD: &str = "difficulty";

/// Appends the raw facet values of `record` to `values`.
///
/// Only string-typed `metadata.subject|system|status|difficulty` values and string
/// tags count. Values are appended as-is; callers deduplicate with
/// [`FilterValues::sorted_unique`] when reading.
pub fn append_record_facets(values: &mut FilterValues, record: &QuestionRecord) {
  let targets = [
    (SUBJECT_FIELD, &mut values.subjects),
    (SYSTEM_FIELD, &mut values.systems),
    (STATUS_FIELD, &mut values.statuses),
    (DIFFICULTY_FIELD, &mut values.difficulties),
  ];
  for (field, target) in targets {
    if let Some(value) = record.raw_metadata_str(field) {
      target.push(value.to_string());
    }
  }

  values.tags.extend(record.raw_tags().map(str::to_string));
}

/// Collects sorted, distinct facet values over `records`.
pub fn collect_filter_values<'a, I>(records: I) -> FilterValues
where
  I: IntoIterator<Item = &'a QuestionRecord>,
{
  let mut values = FilterValues::default();
  for record in records {
    append_record_facets(&mut values, record);
  }
  values.sorted_unique()
}
