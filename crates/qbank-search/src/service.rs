// crates/qbank-search/src/service.rs

//! QbankSearchService: qbank-search クレートの統合ファサード。
//!
//! - 問題コーパスの読み込み (corpus)
//! - 転置インデックスの構築・キャッシュ (QuestionIndex)
//! - 検索・ファセット取得・追加
//!
//! HTTP ハンドラーなどの外部からは、この構造体だけを意識すればよい。
//!
//! # 並行性
//!
//! インデックスは `RwLock` で保護する。
//! 検索系は読み取りロック、`add` は書き込みロックを取るため、書き込みは常に 1 つだけになる。

use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use tracing::info;

use crate::cache::IndexCache;
use crate::config::QbankSearchConfig;
use crate::errors::error_definition::QbankSearchResult;
use crate::indexer::{AddOutcome, IndexBuildReport, QuestionIndex};
use crate::models::{FilterValues, Pagination, SearchRequest, SearchResponse};
use crate::searcher::SearchQuery;

/// qbank-search クレートの統合ファサード。
///
/// 起動時に 1 度だけ構築し、プロセスの生存期間中共有する。
#[derive(Debug)]
pub struct QbankSearchService {
  /// 検証済みの設定
  config: QbankSearchConfig,

  /// 問題インデックス（単一ライター）
  index: RwLock<QuestionIndex>,
}

impl QbankSearchService {
  /// 初期化（設定検証 + コーパス読み込み + インデックス構築）
  ///
  /// # 処理フロー
  /// 1. 設定の妥当性を検証
  /// 2. キャッシュが有効ならキャッシュファイルのハンドルを用意
  /// 3. コーパスを読み込み、キャッシュを使うか再構築してインデックスを作る
  ///
  /// # エラー
  /// - 設定が不正（data_dir が存在しない、limit が不正等）
  /// - コーパスディレクトリの列挙失敗
  pub fn init(config: &QbankSearchConfig) -> QbankSearchResult<Self> {
    // ConfigError は #[from] で QbankSearchError に自動変換
    config.validate()?;

    let cache = config.cache_path().map(IndexCache::new);
    let index = QuestionIndex::from_directory(config.data_dir(), cache, config.fuzzy_options())?;

    let report = index.report();
    info!(
      data_dir = %config.data_dir().display(),
      records = report.total_records,
      indexed = report.indexed,
      source = ?report.source,
      "Question search service initialized"
    );

    Ok(Self {
      config: config.clone(),
      index: RwLock::new(index),
    })
  }

  /// 検索を実行し、1 ページ分の結果を返す。
  ///
  /// `limit` は省略時 `search.default_limit`、指定時も `search.max_limit` で頭打ちにする。
  /// 負の `limit` / `offset` は 0 に切り上げる。
  pub fn search(&self, request: &SearchRequest) -> SearchResponse {
    let limit = self.effective_limit(request.limit);
    let offset = clamp_non_negative(request.offset);
    let query = build_query(request, limit, offset);

    let page = self.index.read().search(&query);

    let returned = page.items.len();
    SearchResponse {
      data: page.items,
      pagination: Pagination {
        total: page.total,
        limit,
        offset,
        returned,
      },
    }
  }

  /// フィルター候補値（ソート・重複除去済み）を返す。
  pub fn filter_values(&self) -> FilterValues {
    self.index.read().filter_values()
  }

  /// 問題を 1 件追加し、キャッシュを書き直す。
  ///
  /// # エラー
  /// - キャッシュの書き込み失敗（メモリ上の追加は反映済み）
  pub fn add(&self, question: JsonValue) -> QbankSearchResult<AddOutcome> {
    let outcome = self.index.write().add(question)?;
    Ok(outcome)
  }

  // ===== アクセサ =====

  /// 取り込み済みの全ペイロードを取り込み順で返す（ID なしも含む）。
  pub fn all(&self) -> Vec<JsonValue> {
    self.index.read().all()
  }

  /// ID で問題を取得する。
  pub fn get(&self, id: &str) -> Option<JsonValue> {
    self.index.read().get(id).cloned()
  }

  /// 取り込み済みの件数を返す。
  pub fn len(&self) -> usize {
    self.index.read().len()
  }

  /// 1 件も取り込まれていないか。
  pub fn is_empty(&self) -> bool {
    self.index.read().is_empty()
  }

  /// 起動時のインデックス構築レポートを返す。
  pub fn build_report(&self) -> IndexBuildReport {
    self.index.read().report().clone()
  }

  /// 設定への参照を返す。
  pub fn config(&self) -> &QbankSearchConfig {
    &self.config
  }

  /// リクエストの limit を実際のページサイズに変換する。
  fn effective_limit(&self, requested: Option<i64>) -> usize {
    requested
      .map(clamp_non_negative)
      .unwrap_or(self.config.default_search_limit())
      .min(self.config.max_search_limit())
  }
}

/// `SearchRequest` を `SearchQuery` に変換する。
fn build_query(request: &SearchRequest, limit: usize, offset: usize) -> SearchQuery {
  let mut query = SearchQuery::new()
    .with_tags(request.tags.iter().cloned())
    .with_limit(limit)
    .with_offset(offset);

  if let Some(text) = &request.query {
    query = query.with_query(text.clone());
  }
  for (field, value) in &request.metadata {
    query = query.with_metadata_filter(field.clone(), value.clone());
  }
  query
}

/// 負数を 0 に切り上げて `usize` に変換する。
fn clamp_non_negative(value: i64) -> usize {
  usize::try_from(value.max(0)).unwrap_or(usize::MAX)
}

// ─────────────────────────────────────────────────────────────────────────────
// テストモジュール
// ─────────────────────────────────────────────────────────────────────────────
