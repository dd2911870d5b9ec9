//! 設定
//!
//! デフォルト値、環境変数（`IVFS_*`）、呼び出し側の上書きを統合する。

use crate::error::{ConfigError, Result};
use crate::file::path::DEFAULT_SEPARATOR;
use crate::logging::LogLevel;
use std::path::PathBuf;

pub const ENV_ROOT: &str = "IVFS_ROOT";
pub const ENV_SEPARATOR: &str = "IVFS_SEPARATOR";
pub const ENV_LOG: &str = "IVFS_LOG";
pub const ENV_LOG_FILE: &str = "IVFS_LOG_FILE";

/// レジストリとロガーの設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VfsConfig {
    /// 論理パスの基準ディレクトリ（未指定時はカレントディレクトリ）
    pub root: Option<PathBuf>,
    /// 論理パスの区切り文字
    pub separator: char,
    /// ログレベル
    pub log_level: LogLevel,
    /// ログファイル出力先
    pub log_file: Option<PathBuf>,
}

impl Default for VfsConfig {
    fn default() -> Self {
        Self {
            root: None,
            separator: DEFAULT_SEPARATOR,
            log_level: LogLevel::Warning,
            log_file: None,
        }
    }
}

impl VfsConfig {
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    pub fn with_log_level(mut self, level: LogLevel) -> Self {
        self.log_level = level;
        self
    }

    pub fn with_log_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.log_file = Some(path.into());
        self
    }

    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の参照関数から設定を読み込む
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(root) = lookup(ENV_ROOT) {
            config.root = Some(expand_path(ENV_ROOT, &root)?);
        }

        if let Some(separator) = lookup(ENV_SEPARATOR) {
            config.separator = parse_separator(&separator)?;
        }

        if let Some(level) = lookup(ENV_LOG) {
            config.log_level = level.parse().map_err(|_| ConfigError::InvalidValue {
                key: ENV_LOG.to_string(),
                value: level.clone(),
            })?;
        }

        if let Some(log_file) = lookup(ENV_LOG_FILE) {
            config.log_file = if log_file.is_empty() {
                default_log_path()
            } else {
                Some(expand_path(ENV_LOG_FILE, &log_file)?)
            };
        }

        Ok(config)
    }

    /// `overrides` で明示指定された値を優先して統合
    pub fn merged_with(&self, overrides: &ConfigOverrides) -> VfsConfig {
        VfsConfig {
            root: overrides.root.clone().or_else(|| self.root.clone()),
            separator: overrides.separator.unwrap_or(self.separator),
            log_level: overrides.log_level.unwrap_or(self.log_level),
            log_file: overrides.log_file.clone().or_else(|| self.log_file.clone()),
        }
    }
}

/// 呼び出し側（コマンドライン等）からの上書き
///
/// `None` は未指定を表し、統合時に元の値を残す。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub root: Option<PathBuf>,
    pub separator: Option<char>,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<PathBuf>,
}

/// 区切り文字の解析（1文字のみ）
pub fn parse_separator(value: &str) -> std::result::Result<char, ConfigError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c != '.' => Ok(c),
        _ => Err(ConfigError::InvalidValue {
            key: ENV_SEPARATOR.to_string(),
            value: value.to_string(),
        }),
    }
}

/// `~` と環境変数を展開
fn expand_path(key: &str, value: &str) -> std::result::Result<PathBuf, ConfigError> {
    shellexpand::full(value)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|e| ConfigError::Expansion {
            key: key.to_string(),
            message: e.to_string(),
        })
}

/// デフォルトのログファイルパス（`~/.ivfs-log/ivfs.log`）
pub fn default_log_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".ivfs-log").join("ivfs.log"))
}
