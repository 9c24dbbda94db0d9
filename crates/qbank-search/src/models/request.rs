//! リクエストモデル定義

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;

/// 検索リクエスト
///
/// すべてのフィールドは省略可能。空のリクエストはコーパス全体（ページング済み）を返す。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
  /// 自由記述のクエリ
  #[serde(default)]
  pub query: Option<String>,

  /// 必須タグ（すべてを含む問題のみ一致）
  #[serde(default)]
  pub tags: Vec<String>,

  /// メタデータフィルター（フィールド内は OR、フィールド間は AND）
  ///
  /// 値はスカラー・配列・オブジェクト（値のみ使用）のいずれでもよい。
  #[serde(default)]
  pub metadata: BTreeMap<String, JsonValue>,

  /// 取得件数（省略時は設定の default_limit、負数は 0 として扱う）
  #[serde(default)]
  pub limit: Option<i64>,

  /// 読み飛ばす件数（負数は 0 として扱う）
  #[serde(default)]
  pub offset: i64,
}
