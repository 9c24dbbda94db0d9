//! 問題コーパス読み込みモジュール
//!
//! ディレクトリ直下の `*.json` をファイル名順に読み込み、
//! 問題ペイロードを 1 本の列（コーパス順）にまとめる。

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use crate::errors::CorpusError;

/// 対象とするファイル拡張子（大文字小文字を区別する）
const QUESTION_FILE_EXTENSION: &str = "json";

/// `dir` 直下の問題ファイルをすべて読み込む
///
/// - ファイル名の昇順で処理し、ファイル内の順序も保持する
/// - 配列は要素ごとに展開し、単一オブジェクトは 1 件として扱う
/// - それ以外の JSON 値、読み込めないファイル、解析できないファイルはスキップする
///
/// # エラー
/// - ディレクトリ自体を列挙できない場合
pub fn load_questions(dir: &Path) -> Result<Vec<JsonValue>, CorpusError> {
  let files = question_files(dir)?;

  let mut questions = Vec::new();
  for path in files {
    let text = match std::fs::read_to_string(&path) {
      Ok(text) => text,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "Skipping unreadable question file");
        continue;
      }
    };

    let value: JsonValue = match serde_json::from_str(&text) {
      Ok(value) => value,
      Err(e) => {
        warn!(path = %path.display(), error = %e, "Skipping unparseable question file");
        continue;
      }
    };

    let before = questions.len();
    match value {
      JsonValue::Array(items) => questions.extend(items),
      JsonValue::Object(_) => questions.push(value),
      _ => {
        warn!(path = %path.display(), "Skipping question file that is neither an array nor an object");
        continue;
      }
    }
    debug!(path = %path.display(), count = questions.len() - before, "Loaded question file");
  }

  Ok(questions)
}

/// `dir` 直下の `*.json` ファイルをファイル名順で返す
fn question_files(dir: &Path) -> Result<Vec<PathBuf>, CorpusError> {
  let read_dir_failed = |e: std::io::Error| CorpusError::ReadDirFailed {
    path: dir.to_path_buf(),
    source: Arc::new(e),
  };

  let mut files = Vec::new();
  for entry in std::fs::read_dir(dir).map_err(read_dir_failed)? {
    let path = entry.map_err(read_dir_failed)?.path();
    let is_question_file =
      path.is_file() && path.extension().is_some_and(|ext| ext == QUESTION_FILE_EXTENSION);
    if is_question_file {
      files.push(path);
    }
  }

  files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
  Ok(files)
}
