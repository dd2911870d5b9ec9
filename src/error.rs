//! エラーハンドリング
//!
//! ハンドル管理で使用される統一されたエラー型を定義。
//! 元の設計では null / 0 を返していた失敗は、すべて `Err` として表現する。

use crate::registry::{FileHandle, FileMode};
use thiserror::Error;

/// ivfs 全体のエラー型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// パスがファイルシステム上に存在しない
    #[error("File not found: {path}")]
    NotFound { path: String },

    /// 既存ハンドルのモードと要求モードが衝突
    #[error("Mode conflict on {path}: held {held}, requested {requested}")]
    ModeConflict {
        path: String,
        held: FileMode,
        requested: FileMode,
    },

    /// 登録されていない（クローズ済みの）ハンドル
    #[error("Handle not registered: {handle}")]
    HandleNotRegistered { handle: FileHandle },

    /// 下位ファイルシステムのI/Oエラー
    #[error("IO error on {path}: {message}")]
    Io { path: String, message: String },

    /// 設定エラー
    #[error("Configuration error")]
    Config(#[from] ConfigError),
}

/// 設定固有のエラー
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Path expansion failed for {key}: {message}")]
    Expansion { key: String, message: String },
}

/// エラー分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    ModeConflict,
    HandleNotRegistered,
    Io,
    Config,
}

impl VfsError {
    /// エラー分類を取得
    pub fn kind(&self) -> ErrorKind {
        match self {
            VfsError::NotFound { .. } => ErrorKind::NotFound,
            VfsError::ModeConflict { .. } => ErrorKind::ModeConflict,
            VfsError::HandleNotRegistered { .. } => ErrorKind::HandleNotRegistered,
            VfsError::Io { .. } => ErrorKind::Io,
            VfsError::Config(_) => ErrorKind::Config,
        }
    }

    /// std::io::Error をパス情報付きで変換
    pub fn io(path: impl Into<String>, error: std::io::Error) -> Self {
        VfsError::Io {
            path: path.into(),
            message: error.to_string(),
        }
    }

    /// NotFound の生成
    pub fn not_found(path: impl Into<String>) -> Self {
        VfsError::NotFound { path: path.into() }
    }
}

// パス不明の std::io::Error から VfsError への変換
impl From<std::io::Error> for VfsError {
    fn from(error: std::io::Error) -> Self {
        VfsError::Io {
            path: String::new(),
            message: error.to_string(),
        }
    }
}

/// プロジェクト標準のResult型
pub type Result<T> = std::result::Result<T, VfsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_classification() {
        let error = VfsError::not_found("a/b.txt");
        assert_eq!(error.kind(), ErrorKind::NotFound);

        let error = VfsError::ModeConflict {
            path: "a/b.txt".to_string(),
            held: FileMode::WriteOnly,
            requested: FileMode::ReadOnly,
        };
        assert_eq!(error.kind(), ErrorKind::ModeConflict);
        assert_eq!(
            error.to_string(),
            "Mode conflict on a/b.txt: held writeonly, requested readonly"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let error = VfsError::io("x.txt", io_error);

        match error {
            VfsError::Io { path, message } => {
                assert_eq!(path, "x.txt");
                assert!(message.contains("disk on fire"));
            }
            _ => panic!("Expected Io error"),
        }
    }

    #[test]
    fn test_config_error_conversion() {
        let error: VfsError = ConfigError::InvalidValue {
            key: "IVFS_SEPARATOR".to_string(),
            value: "ab".to_string(),
        }
        .into();
        assert_eq!(error.kind(), ErrorKind::Config);
    }
}
