//! ivfs - virtual file-handle manager
//!
//! 実ファイルシステム上の論理パスについて、読み込み/書き込みハンドルの
//! 排他ルールを管理する。バイトの保存は下位ファイルシステムに委譲する。

// コアモジュール
pub mod config;
pub mod error;
pub mod logging;

// データ層
pub mod file;

// ハンドル管理
pub mod registry;

// 公開API
pub use config::{ConfigOverrides, VfsConfig};
pub use error::{ErrorKind, Result, VfsError};
pub use registry::{FileHandle, FileMode, Registry};
