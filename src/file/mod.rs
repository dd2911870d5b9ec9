//! ファイル操作モジュール
//!
//! 下位ファイルシステムへの委譲とパス解決：
//! - バイト保存は `FileStore` 実装に委譲
//! - 新規作成前にディレクトリチェーンを実体化
//! - パスの正規化は行わない（文字列としてそのまま比較）

pub mod io;
pub mod path;

pub use io::{DiskStore, FileStore};
pub use path::{PathResolver, ResolvedPath, DEFAULT_SEPARATOR};
