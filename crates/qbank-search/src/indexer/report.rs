//! インデックス構築結果のレポート型定義
//!
//! 起動時の構築で、何件が検索対象になり何件がスキップされたかを集計する。

use serde::Serialize;

/// 転置インデックスの取得元
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexSource {
  /// フィンガープリントが一致したキャッシュから読み込んだ
  Cache,
  /// コーパスから再構築した
  #[default]
  Rebuilt,
}

/// `QuestionIndex::build` の集計結果
#[derive(Debug, Clone, Default, Serialize)]
pub struct IndexBuildReport {
  /// 入力された問題の総数
  pub total_records: usize,
  /// ID を持ち検索対象になった件数
  pub indexed: usize,
  /// ID を導出できずスキップされた件数
  pub skipped_without_id: usize,
  /// 既出の ID のためスキップされた件数
  pub skipped_duplicates: usize,
  /// インデックスの取得元
  pub source: IndexSource,
  /// キャッシュファイルを書き出したか
  pub cache_written: bool,
}

impl IndexBuildReport {
  /// すべての問題が検索対象になったか
  pub fn is_all_indexed(&self) -> bool {
    self.skipped_without_id == 0 && self.skipped_duplicates == 0
  }

  /// 合計件数を記録
  pub fn record_total(&mut self) {
    self.total_records += 1;
  }

  /// 検索対象化を記録
  pub fn record_indexed(&mut self) {
    self.indexed += 1;
  }

  /// ID なしスキップを記録
  pub fn record_without_id(&mut self) {
    self.skipped_without_id += 1;
  }

  /// 重複スキップを記録
  pub fn record_duplicate(&mut self) {
    self.skipped_duplicates += 1;
  }
}
