//! 正規化・トークナイズモジュール
//!
//! 任意の JSON 値を小文字の単語トークン集合へ変換する。
//! 想定外の形の入力はエラーにせず、空の結果として扱う。

use std::collections::HashSet;

use serde_json::Value as JsonValue;

/// トークンを構成する文字か（`[A-Za-z0-9']`）
fn is_token_char(c: char) -> bool {
  c.is_ascii_alphanumeric() || c == '\''
}

/// 文字列を前後空白除去 + 小文字化する
pub fn normalize_str(value: &str) -> String {
  value.trim().to_lowercase()
}

/// 任意の値を正規化済みスカラー文字列に変換する
///
/// - 文字列: そのまま `normalize_str`
/// - 真偽値・数値: 文字列化してから正規化（`true`, `42`, `1.5`）
/// - null: `"none"`
/// - 配列・オブジェクト: コンパクトな JSON 文字列として正規化
pub fn normalize_scalar(value: &JsonValue) -> String {
  match value {
    JsonValue::String(s) => normalize_str(s),
    JsonValue::Null => "none".to_string(),
    other => normalize_str(&other.to_string()),
  }
}

/// テキストから `[A-Za-z0-9']+` の最長連続部分を抽出し、小文字の集合として返す
///
/// # Examples
/// ```
/// use qbank_search::tokenizer::tokenize;
///
/// let tokens = tokenize("Pulmonary EMBOLISM (PE), patient's");
/// assert!(tokens.contains("embolism"));
/// assert!(tokens.contains("patient's"));
/// assert_eq!(tokens.len(), 4);
/// ```
pub fn tokenize(text: &str) -> HashSet<String> {
  text
    .split(|c: char| !is_token_char(c))
    .filter(|s| !s.is_empty())
    .map(|s| s.to_ascii_lowercase())
    .collect()
}

/// 入れ子の配列・オブジェクトから文字列の葉をすべて列挙する
///
/// - 文字列は 1 つの葉として扱う（文字単位には分割しない）
/// - オブジェクトは値のみを辿る（キーは含めない）
/// - 数値・真偽値は文字列化して返す
/// - null は何も返さない
pub fn iter_strings(value: &JsonValue) -> impl Iterator<Item = String> {
  let mut leaves = Vec::new();
  collect_strings(value, &mut leaves);
  leaves.into_iter()
}

/// `iter_strings` の再帰本体
fn collect_strings(value: &JsonValue, out: &mut Vec<String>) {
  match value {
    JsonValue::Null => {}
    JsonValue::String(s) => out.push(s.clone()),
    JsonValue::Bool(b) => out.push(b.to_string()),
    JsonValue::Number(n) => out.push(n.to_string()),
    JsonValue::Array(items) => {
      for item in items {
        collect_strings(item, out);
      }
    }
    JsonValue::Object(map) => {
      for item in map.values() {
        collect_strings(item, out);
      }
    }
  }
}
