//! qbank-search 問題バンク検索ライブラリー
//!
//! 医学系問題バンクの JSON コーパスに対し、転置インデックスによる
//! 全文検索・タグ / メタデータ絞り込み・あいまい一致を行う

/// キャッシュモジュール - 転置インデックスの永続化とフィンガープリント検証
pub mod cache;

/// 設定モジュール - QbankSearchConfig, LogLevel等の設定構造体を定義
pub mod config;

/// コーパスモジュール - 問題ファイルの読み込み
pub mod corpus;

/// エラーモジュール - QbankSearchError, QbankSearchResult等のエラー型を定義
pub mod errors;

/// あいまい一致モジュール - 類似度計算と近似候補の選択
pub mod fuzzy;

/// インデックスモジュール - 転置インデックスの構築・追加・ページング検索
pub mod indexer;

/// ロギングモジュール - tracing サブスクライバーの初期化
pub mod logging;

/// データモデルモジュール - QuestionRecord, SearchRequest等のデータ構造を定義
pub mod models;

/// 検索モジュール - クエリの正規化と評価
pub mod searcher;

/// サービスモジュール - QbankSearchService等の上位レベルAPIを提供
pub mod service;

/// トークナイザーモジュール - 正規化と単語トークン抽出
pub mod tokenizer;

/// 再エクスポート
pub use config::{LogLevel, QbankSearchConfig};
pub use errors::{QbankSearchError, QbankSearchResult};
pub use indexer::{AddOutcome, QuestionIndex};
pub use searcher::{FuzzyOptions, SearchQuery};
pub use service::QbankSearchService;
