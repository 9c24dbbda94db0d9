//! エラー定義

use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// 設定（QbankSearchConfig）関連のエラー
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum ConfigError {
  /// 設定ファイルの読み込みに失敗
  #[error("設定ファイルの読み込みに失敗しました: path={path:?}, error={source}")]
  ReadFailed {
    /// 設定ファイルのパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// 設定ファイルの JSON 解析に失敗
  #[error("設定ファイルの解析に失敗しました: path={path:?}, error={source}")]
  ParseFailed {
    /// 設定ファイルのパス
    path: PathBuf,
    /// 元となった JSON エラー
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// corpus.data_dir が存在しない
  #[error("corpus.data_dir が見つかりません: path={path:?}")]
  CorpusDirNotFound {
    /// 指定されたパス
    path: PathBuf,
  },

  /// corpus.data_dir がディレクトリではない
  #[error("corpus.data_dir がディレクトリではありません: path={path:?}")]
  CorpusDirNotADirectory {
    /// 指定されたパス
    path: PathBuf,
  },

  /// search.default_limit < 1
  #[error("search.default_limit は 1 以上である必要があります: actual={actual}")]
  InvalidSearchDefaultLimit {
    /// 実際に指定された値
    actual: usize,
  },

  /// search.max_limit < search.default_limit
  #[error(
    "search.max_limit は search.default_limit 以上である必要があります: \
     default_limit={default_limit}, max_limit={max_limit}"
  )]
  InvalidSearchMaxLimit {
    /// search.default_limit
    default_limit: usize,
    /// search.max_limit
    max_limit: usize,
  },

  /// search.fuzzy_cutoff が 0.0〜1.0 の範囲外
  #[error("search.fuzzy_cutoff は 0.0〜1.0 の範囲で指定してください: actual={actual}")]
  InvalidFuzzyCutoff {
    /// 実際に指定された値
    actual: f64,
  },

  /// search.fuzzy_max_matches < 1
  #[error("search.fuzzy_max_matches は 1 以上である必要があります: actual={actual}")]
  InvalidFuzzyMaxMatches {
    /// 実際に指定された値
    actual: usize,
  },

  /// cache.path がディレクトリを指している
  #[error("cache.path はファイルを指定してください: path={path:?}")]
  InvalidCachePath {
    /// 不正なパス
    path: PathBuf,
  },

  /// キャッシュファイルの親ディレクトリ作成に失敗
  #[error("キャッシュディレクトリの作成に失敗しました: path={path:?}, error={source}")]
  CacheDirCreationFailed {
    /// 作成しようとしたパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },
}

/// 問題コーパス読み込み関連のエラー
///
/// 個々のファイルの破損はエラーにせずスキップする。
/// ディレクトリ自体が列挙できない場合のみここに該当する。
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CorpusError {
  /// コーパスディレクトリの列挙に失敗
  #[error("コーパスディレクトリを読み込めません: path={path:?}, error={source}")]
  ReadDirFailed {
    /// 対象ディレクトリ
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },
}

/// インデックスキャッシュの書き込み関連エラー
///
/// 読み込み側の失敗はコールドキャッシュとして扱うため、エラーにはならない。
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum CacheError {
  /// キャッシュディレクトリの作成に失敗
  #[error("キャッシュディレクトリの作成に失敗しました: path={path:?}, error={source}")]
  CreateDirFailed {
    /// 作成しようとしたパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// キャッシュドキュメントのシリアライズに失敗
  #[error("キャッシュのシリアライズに失敗しました: error={source}")]
  Serialize {
    /// 元となった JSON エラー
    #[source]
    source: Arc<serde_json::Error>,
  },

  /// 一時ファイルへの書き込みに失敗
  #[error("キャッシュファイルの書き込みに失敗しました: path={path:?}, error={source}")]
  WriteFailed {
    /// 書き込み先のパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },

  /// 一時ファイルから本来のパスへの置き換えに失敗
  #[error("キャッシュファイルの置き換えに失敗しました: path={path:?}, error={source}")]
  PersistFailed {
    /// 置き換え先のパス
    path: PathBuf,
    /// 元となった IO エラー
    #[source]
    source: Arc<io::Error>,
  },
}

/// 統合エラー
/// 本クレートの外部に公開するエラー用 API はこのエラーを返すこと
/// `QbankSearchResult<T>` = `Result<T, QbankSearchError>` として使用する
#[derive(Debug, Error, Clone)]
#[non_exhaustive]
pub enum QbankSearchError {
  /// 設定エラー
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// コーパス読み込みエラー
  #[error(transparent)]
  Corpus(#[from] CorpusError),

  /// キャッシュ書き込みエラー
  #[error(transparent)]
  Cache(#[from] CacheError),
}

/// qbank-search クレートの標準 Result 型エイリアス
pub type QbankSearchResult<T> = Result<T, QbankSearchError>;
