//! ロギング初期化モジュール

use tracing_subscriber::EnvFilter;

use crate::config::LogLevel;

/// `tracing_subscriber::fmt` をグローバルサブスクライバーとして登録する
///
/// - `RUST_LOG` が設定されていればそちらを優先し、なければ `level` を使う
/// - すでに登録済みの場合は何もしない（2 回目以降の呼び出しは `false` を返す）
pub fn init_tracing(level: LogLevel) -> bool {
  let env_filter =
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

  tracing_subscriber::fmt()
    .with_env_filter(env_filter)
    .with_target(true)
    .with_level(true)
    .try_init()
    .is_ok()
}
