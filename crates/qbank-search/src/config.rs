// crates/qbank-search/src/config.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Deserialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::errors::ConfigError;
use crate::searcher::FuzzyOptions;

/// Directory name under the platform cache dir used when `cache.path` is omitted.
const DEFAULT_CACHE_DIR_NAME: &str = "qbank-search";

/// File name stem of the persisted index cache; the corpus hash is appended.
const DEFAULT_CACHE_FILE_STEM: &str = "question_index";

/// `question_index-<xxh3 of the canonical data_dir>.json`
///
/// Falls back to the path as given when it cannot be canonicalized.
fn default_cache_file_name(data_dir: &Path) -> String {
  let canonical = std::fs::canonicalize(data_dir).unwrap_or_else(|_| data_dir.to_path_buf());
  let hash = xxh3_64(canonical.as_os_str().as_encoded_bytes());
  format!("{DEFAULT_CACHE_FILE_STEM}-{hash:016x}.json")
}

/// Top-level configuration for qbank-search.
#[derive(Debug, Clone, Deserialize)]
pub struct QbankSearchConfig {
  /// [corpus] section
  pub corpus: CorpusConfig,
  /// [cache] section
  #[serde(default)]
  pub cache: CacheConfig,
  /// [search] section
  #[serde(default)]
  pub search: SearchConfig,
  /// [logging] section
  #[serde(default)]
  pub logging: LoggingConfig,
}

/// [corpus] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CorpusConfig {
  /// Directory holding the `*.json` question files (e.g., "/opt/qbank/data/questions")
  pub data_dir: PathBuf,
}

/// [cache] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Whether the persisted index cache is read and written at all.
  #[serde(default = "default_cache_enabled")]
  pub enabled: bool,
  /// Cache file location.
  ///
  /// If omitted, it becomes `None`, and `<platform cache dir>/qbank-search/question_index-<corpus hash>.json` is used.
  #[serde(default)]
  pub path: Option<PathBuf>,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      enabled: default_cache_enabled(),
      path: None,
    }
  }
}

/// Cache is on unless explicitly disabled
fn default_cache_enabled() -> bool {
  true
}

/// [search] section configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
  /// Page size used when a request carries no limit
  #[serde(default = "default_limit")]
  pub default_limit: usize,
  /// Upper bound applied to requested page sizes
  #[serde(default = "default_max_limit")]
  pub max_limit: usize,
  /// Minimum similarity (0.0 - 1.0) for a fuzzy token match
  #[serde(default = "default_fuzzy_cutoff")]
  pub fuzzy_cutoff: f64,
  /// Number of fuzzy candidates kept per query token
  #[serde(default = "default_fuzzy_max_matches")]
  pub fuzzy_max_matches: usize,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      default_limit: default_limit(),
      max_limit: default_max_limit(),
      fuzzy_cutoff: default_fuzzy_cutoff(),
      fuzzy_max_matches: default_fuzzy_max_matches(),
    }
  }
}

fn default_limit() -> usize {
  20
}

fn default_max_limit() -> usize {
  200
}

fn default_fuzzy_cutoff() -> f64 {
  FuzzyOptions::default().cutoff
}

fn default_fuzzy_max_matches() -> usize {
  FuzzyOptions::default().max_matches
}

/// [logging] section configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingConfig {
  /// Log level: "trace" | "debug" | "info" | "warn" | "error"
  #[serde(default)]
  pub level: LogLevel,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
  /// trace
  Trace,

  /// debug
  Debug,

  /// info
  #[default]
  Info,

  /// warn
  Warn,

  ///error
  Error,
}

impl LogLevel {
  /// Returns the directive string understood by `EnvFilter`.
  pub fn as_str(&self) -> &'static str {
    match self {
      LogLevel::Trace => "trace",
      LogLevel::Debug => "debug",
      LogLevel::Info => "info",
      LogLevel::Warn => "warn",
      LogLevel::Error => "error",
    }
  }
}

impl std::fmt::Display for LogLevel {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

// ===== Constructors =====

impl QbankSearchConfig {
  /// Builds a configuration for `data_dir` with every other section at its default.
  pub fn for_data_dir(data_dir: impl Into<PathBuf>) -> Self {
    Self {
      corpus: CorpusConfig {
        data_dir: data_dir.into(),
      },
      cache: CacheConfig::default(),
      search: SearchConfig::default(),
      logging: LoggingConfig::default(),
    }
  }

  /// Loads a configuration from a JSON file.
  ///
  /// The file is only parsed here; call [`validate`](Self::validate) before use.
  pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
      path: path.to_path_buf(),
      source: Arc::new(e),
    })?;

    serde_json::from_str(&raw).map_err(|e| ConfigError::ParseFailed {
      path: path.to_path_buf(),
      source: Arc::new(e),
    })
  }
}

// ===== Accessor Methods =====

impl QbankSearchConfig {
  /// Returns the corpus directory.
  pub fn data_dir(&self) -> &Path {
    &self.corpus.data_dir
  }

  /// Returns the cache file path to use, or `None` when persistence is off.
  ///
  /// Resolution order:
  /// 1. `cache.enabled = false` → `None`
  /// 2. explicit `cache.path`
  /// 3. `<platform cache dir>/qbank-search/question_index-<corpus hash>.json`, one file per
  ///    canonical `corpus.data_dir`
  /// 4. `None` when the platform has no cache dir
  pub fn cache_path(&self) -> Option<PathBuf> {
    if !self.cache.enabled {
      return None;
    }

    if let Some(path) = &self.cache.path {
      return Some(path.clone());
    }

    dirs::cache_dir()
      .map(|base| base.join(DEFAULT_CACHE_DIR_NAME).join(default_cache_file_name(self.data_dir())))
  }

  /// Returns the fuzzy matching parameters for the query engine.
  pub fn fuzzy_options(&self) -> FuzzyOptions {
    FuzzyOptions {
      cutoff: self.search.fuzzy_cutoff,
      max_matches: self.search.fuzzy_max_matches,
    }
  }

  /// Returns the default search result limit.
  pub fn default_search_limit(&self) -> usize {
    self.search.default_limit
  }

  /// Returns the maximum search result limit.
  pub fn max_search_limit(&self) -> usize {
    self.search.max_limit
  }

  /// Returns the log level.
  pub fn log_level(&self) -> LogLevel {
    self.logging.level
  }

  /// Validates the configuration.
  ///
  /// # Validation Items
  /// - `corpus.data_dir` exists and is a directory
  /// - `search.default_limit` >= 1
  /// - `search.max_limit` >= `search.default_limit`
  /// - `search.fuzzy_cutoff` is within 0.0 - 1.0
  /// - `search.fuzzy_max_matches` >= 1
  /// - the cache path (if any) is not a directory, and its parent exists or can be created
  ///
  /// # Errors
  /// Returns the corresponding `ConfigError` for the first failing item.
  pub fn validate(&self) -> Result<(), ConfigError> {
    let data_dir = &self.corpus.data_dir;
    if !data_dir.exists() {
      return Err(ConfigError::CorpusDirNotFound {
        path: data_dir.clone(),
      });
    }
    if !data_dir.is_dir() {
      return Err(ConfigError::CorpusDirNotADirectory {
        path: data_dir.clone(),
      });
    }

    // search.default_limit >= 1
    if self.search.default_limit < 1 {
      return Err(ConfigError::InvalidSearchDefaultLimit {
        actual: self.search.default_limit,
      });
    }

    // search.max_limit >= search.default_limit
    if self.search.max_limit < self.search.default_limit {
      return Err(ConfigError::InvalidSearchMaxLimit {
        default_limit: self.search.default_limit,
        max_limit: self.search.max_limit,
      });
    }

    // NaN fails the range check as well
    if !(0.0..=1.0).contains(&self.search.fuzzy_cutoff) {
      return Err(ConfigError::InvalidFuzzyCutoff {
        actual: self.search.fuzzy_cutoff,
      });
    }

    if self.search.fuzzy_max_matches < 1 {
      return Err(ConfigError::InvalidFuzzyMaxMatches {
        actual: self.search.fuzzy_max_matches,
      });
    }

    if let Some(cache_path) = self.cache_path() {
      if cache_path.is_dir() {
        return Err(ConfigError::InvalidCachePath { path: cache_path });
      }

      if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !parent.exists() {
          if let Err(e) = std::fs::create_dir_all(parent) {
            return Err(ConfigError::CacheDirCreationFailed {
              path: parent.to_path_buf(),
              source: Arc::new(e),
            });
          }
        }
      }
    }

    Ok(())
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Test Module
// ─────────────────────────────────────────────────────────────────────────────
