//! 検索クエリ定義モジュール
//!
//! 呼び出し側が組み立てる `SearchQuery` と、
//! クエリエンジンが評価する正規化済み形式 `NormalizedQuery` を提供します。

use std::collections::{BTreeMap, BTreeSet};

use serde_json::Value as JsonValue;

use crate::tokenizer::{normalize_scalar, normalize_str, tokenize};

/// 検索条件（ビルダー形式）
///
/// # Examples
/// ```
/// use qbank_search::searcher::SearchQuery;
///
/// let query = SearchQuery::new()
///   .with_query("pulmonary embolism")
///   .with_tags(["High-Yield"])
///   .with_metadata_filter("subject", "Pathology")
///   .with_limit(10);
///
/// let normalized = query.normalize();
/// assert!(normalized.tokens.contains("embolism"));
/// assert!(normalized.tags.contains("high-yield"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
  /// フリーテキストクエリ
  query: Option<String>,
  /// 必須タグ（すべて一致）
  tags: Vec<String>,
  /// メタデータフィルター（フィールド間 AND、値は OR）
  metadata_filters: BTreeMap<String, JsonValue>,
  /// 最大件数（`None` は無制限）
  limit: Option<usize>,
  /// 先頭からスキップする件数
  offset: usize,
}

impl SearchQuery {
  /// 空のクエリ（全件一致）を作成
  pub fn new() -> Self {
    Self::default()
  }

  /// フリーテキストクエリを設定
  #[must_use]
  pub fn with_query(mut self, query: impl Into<String>) -> Self {
    self.query = Some(query.into());
    self
  }

  /// 必須タグを追加
  #[must_use]
  pub fn with_tags<I, S>(mut self, tags: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.tags.extend(tags.into_iter().map(Into::into));
    self
  }

  /// メタデータフィルターを設定
  ///
  /// 値はスカラー・配列・オブジェクトのいずれでもよい。
  /// 配列とオブジェクトは、その要素（値）のいずれかに一致すれば通過する。
  #[must_use]
  pub fn with_metadata_filter(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
    self.metadata_filters.insert(field.into(), value.into());
    self
  }

  /// 最大件数を設定
  #[must_use]
  pub fn with_limit(mut self, limit: usize) -> Self {
    self.limit = Some(limit);
    self
  }

  /// オフセットを設定
  #[must_use]
  pub fn with_offset(mut self, offset: usize) -> Self {
    self.offset = offset;
    self
  }

  /// 最大件数
  pub fn limit(&self) -> Option<usize> {
    self.limit
  }

  /// オフセット
  pub fn offset(&self) -> usize {
    self.offset
  }

  /// クエリを評価用の正規化形式に変換する
  ///
  /// - クエリ文字列はトークン化する
  /// - タグは前後空白除去 + 小文字化し、空文字は捨てる
  /// - メタデータのフィールド名は小文字化する（同名になったフィールドの値は統合）
  /// - メタデータの値は `normalize_scalar` で正規化し、null と空文字は捨てる
  pub fn normalize(&self) -> NormalizedQuery {
    let tokens = self
      .query
      .as_deref()
      .map(tokenize)
      .unwrap_or_default()
      .into_iter()
      .collect();

    let tags = self
      .tags
      .iter()
      .map(|tag| normalize_str(tag))
      .filter(|tag| !tag.is_empty())
      .collect();

    let mut metadata: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (field, value) in &self.metadata_filters {
      metadata.entry(normalize_str(field)).or_default().extend(allowed_values(value));
    }

    NormalizedQuery {
      tokens,
      tags,
      metadata,
    }
  }
}

/// フィルター値から許容値の集合を作る
fn allowed_values(value: &JsonValue) -> BTreeSet<String> {
  let items: Vec<&JsonValue> = match value {
    JsonValue::Array(items) => items.iter().collect(),
    JsonValue::Object(map) => map.values().collect(),
    scalar => vec![scalar],
  };

  items
    .into_iter()
    .filter(|item| !item.is_null())
    .map(normalize_scalar)
    .filter(|item| !item.is_empty())
    .collect()
}

/// 正規化済みクエリ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedQuery {
  /// クエリトークン（AND）
  pub tokens: BTreeSet<String>,
  /// 必須タグ（AND）
  pub tags: BTreeSet<String>,
  /// フィールド → 許容値（フィールド間 AND、値は OR）
  pub metadata: BTreeMap<String, BTreeSet<String>>,
}

impl NormalizedQuery {
  /// 条件が何もない（全件一致）か
  pub fn is_unconstrained(&self) -> bool {
    self.tokens.is_empty() && self.tags.is_empty() && self.metadata.is_empty()
  }
}

/// 検索結果の 1 ページ
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
  /// ページ内の生ペイロード（コーパス順）
  pub items: Vec<JsonValue>,
  /// ページ分割前の一致件数
  pub total: usize,
}
