//! パス解決とディレクトリ実体化
//!
//! 論理パスをセグメントに分割し、ファイル名より前のセグメントを
//! 作成すべきディレクトリとして扱う。正規化（大文字小文字、`.`/`..`、
//! 末尾区切り文字）は行わない。

use crate::error::Result;
use crate::file::io::FileStore;

/// デフォルトのディレクトリ区切り文字
pub const DEFAULT_SEPARATOR: char = '/';

/// 分割済みの論理パス
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath<'a> {
    /// 作成すべきディレクトリのセグメント（先頭の空セグメントは絶対パスを表す）
    pub directories: Vec<&'a str>,
    /// ファイル名セグメント
    pub file_name: Option<&'a str>,
}

/// パス解決器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathResolver {
    separator: char,
}

impl PathResolver {
    pub fn new(separator: char) -> Self {
        Self { separator }
    }

    /// パスをディレクトリ部分とファイル名に分割
    ///
    /// `.` を含む最初のセグメントをファイル名とする。
    /// `.` を含むセグメントが無い場合は最後のセグメントをファイル名とする。
    pub fn split<'a>(&self, path: &'a str) -> ResolvedPath<'a> {
        let segments: Vec<&'a str> = path.split(self.separator).collect();

        let file_index = segments
            .iter()
            .position(|segment| segment.contains('.'))
            .unwrap_or(segments.len().saturating_sub(1));

        let file_name = segments.get(file_index).copied().filter(|s| !s.is_empty());
        let directories = segments[..file_index.min(segments.len())].to_vec();

        ResolvedPath {
            directories,
            file_name,
        }
    }

    /// 作成すべきディレクトリチェーンを論理パスとして返す
    pub fn directory_of(&self, path: &str) -> Option<String> {
        let resolved = self.split(path);
        if resolved.directories.iter().all(|s| s.is_empty()) {
            return None;
        }

        let separator = self.separator.to_string();
        Some(resolved.directories.join(&separator))
    }

    /// ディレクトリチェーンをファイルシステム上に作成
    ///
    /// 既に存在する場合は何もしない。レジストリには影響しない。
    pub fn materialize(&self, store: &dyn FileStore, path: &str) -> Result<()> {
        if let Some(directory) = self.directory_of(path) {
            log::trace!("materializing directories {} for {}", directory, path);
            store.create_dirs(&directory)?;
        }
        Ok(())
    }
}

impl Default for PathResolver {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}
