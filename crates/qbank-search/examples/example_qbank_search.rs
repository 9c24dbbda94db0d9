//! qbank-search crate example
//!
//! Writes a small question bank to a temporary directory, starts the service
//! cold and warm, runs a few searches, and adds a question.

use serde_json::json;
use tempfile::TempDir;

use qbank_search::QbankSearchConfig;
use qbank_search::QbankSearchService;
use qbank_search::logging::init_tracing;
use qbank_search::models::{SearchRequest, SearchResponse};

/// Application common result type
type AppResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Writes the sample question bank into `dir`.
fn write_question_bank(dir: &std::path::Path) -> AppResult<()> {
  let cardiology = json!([
    {
      "id": "q_1a2b3c4d",
      "stem": "A 58-year-old man develops pleuritic chest pain after hip surgery. CT angiography shows a pulmonary embolism.",
      "choices": [
        {"label": "A", "text": "Heparin"},
        {"label": "B", "text": "Aspirin"}
      ],
      "answer": "A",
      "explanation": {"summary": "Anticoagulate acute pulmonary embolism."},
      "tags": ["vascular", "high-yield"],
      "metadata": {"subject": "Pathology", "system": "Respiratory", "difficulty": "medium", "status": "published"}
    },
    {
      "id": "q_9c8d7e6f",
      "stem": "A crescendo-decrescendo systolic murmur radiates to the carotids.",
      "answer": "B",
      "tags": ["cardio"],
      "metadata": {"subject": "Physiology", "system": "Cardiovascular", "difficulty": "easy", "status": "published"}
    }
  ]);
  let microbiology = json!({
    "id": "q_5e6f7a8b",
    "stem": "A child develops a sandpaper rash after streptococcal infection.",
    "tags": ["infection"],
    "metadata": {"subject": "Microbiology", "system": "Skin", "difficulty": "hard", "status": "draft"}
  });

  std::fs::write(dir.join("01_cardiology.json"), serde_json::to_string_pretty(&cardiology)?)?;
  std::fs::write(dir.join("02_microbiology.json"), serde_json::to_string_pretty(&microbiology)?)?;
  Ok(())
}

/// Prints one search response.
fn print_response(label: &str, response: &SearchResponse) {
  println!("\n=== {label} ===");
  println!("  {:?}", response.pagination);
  for item in &response.data {
    println!("  {} | {}", item["id"], item["stem"]);
  }
}

fn main() -> AppResult<()> {
  let temp_dir = TempDir::new()?;
  let data_dir = temp_dir.path().join("questions");
  std::fs::create_dir(&data_dir)?;
  write_question_bank(&data_dir)?;

  let mut config = QbankSearchConfig::for_data_dir(&data_dir);
  config.cache.path = Some(temp_dir.path().join("cache").join("question_index.json"));
  init_tracing(config.log_level());

  // 1. Cold start: index is built and written to the cache
  let service = QbankSearchService::init(&config)?;
  println!("cold start: {:?}", service.build_report());

  // Same corpus again: served from the cache
  let warm = QbankSearchService::init(&config)?;
  println!("warm start: {:?}", warm.build_report());

  // 2. Free text, including a misspelling
  let request = SearchRequest {
    query: Some("embolsm".to_string()),
    ..Default::default()
  };
  print_response("query = embolsm", &service.search(&request));

  // 3. Tags and metadata
  let request: SearchRequest = serde_json::from_value(json!({
    "tags": ["infection"],
    "metadata": {"subject": ["Microbiology", "Pathology"]}
  }))?;
  print_response("tags = infection, subject in (Microbiology, Pathology)", &service.search(&request));

  // 4. Facets
  println!("\nfilter values: {}", serde_json::to_string_pretty(&service.filter_values())?);

  // 5. Incremental add
  let outcome = service.add(json!({
    "id": "q_0f1e2d3c",
    "stem": "Kawasaki disease presents with fever and coronary aneurysm.",
    "tags": ["vascular"],
    "metadata": {"subject": "Pathology", "system": "Cardiovascular"}
  }))?;
  println!("\nadd outcome: {outcome:?}");

  let request = SearchRequest {
    tags: vec!["vascular".to_string()],
    limit: Some(1),
    offset: 1,
    ..Default::default()
  };
  print_response("tags = vascular, page 2", &service.search(&request));

  // 6. The added question is not in the files on disk, so the fingerprint differs and
  //    the next start rebuilds
  let restarted = QbankSearchService::init(&config)?;
  println!("\nrestart: {:?}", restarted.build_report());

  Ok(())
}
