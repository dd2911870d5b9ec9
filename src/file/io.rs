//! ファイルI/O操作
//!
//! 実際のバイト保存を担う下位ファイルシステムの抽象と、
//! `std::fs` による実装

use crate::error::{Result, VfsError};
use crate::file::path::DEFAULT_SEPARATOR;
use std::fs::{self, File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{PathBuf, MAIN_SEPARATOR};

/// 下位ファイルシステムのトレイト
///
/// パスはすべて論理パス（区切り文字は実装側の設定に従う）。
pub trait FileStore: Send + Sync {
    /// パスが存在するかチェック
    fn exists(&self, path: &str) -> bool;

    /// ディレクトリチェーンを作成（存在する場合は何もしない）
    fn create_dirs(&self, path: &str) -> Result<()>;

    /// 空ファイルを作成（既存ファイルは変更しない）
    fn touch(&self, path: &str) -> Result<()>;

    /// 先頭から読み込むリーダーを開く
    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>>;

    /// ファイルを切り詰めて書き込むライターを開く
    fn open_truncate(&self, path: &str) -> Result<Box<dyn Write + Send>>;
}

/// ディスク上のファイルシステム実装
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: Option<PathBuf>,
    separator: char,
}

impl DiskStore {
    /// カレントディレクトリ基準のストアを作成
    pub fn new() -> Self {
        Self {
            root: None,
            separator: DEFAULT_SEPARATOR,
        }
    }

    /// ルートディレクトリを設定
    ///
    /// ルート設定時は論理パス先頭の区切り文字を取り除き、絶対パスも
    /// ルート配下として扱う。`..` は解決しないため、ルート外への参照は防がない。
    pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.root = Some(root.into());
        self
    }

    /// 論理パスの区切り文字を設定
    pub fn with_separator(mut self, separator: char) -> Self {
        self.separator = separator;
        self
    }

    /// 論理パスを実パスに変換
    pub fn resolve(&self, path: &str) -> PathBuf {
        let native = if self.separator == MAIN_SEPARATOR {
            path.to_string()
        } else {
            path.replace(self.separator, &MAIN_SEPARATOR.to_string())
        };

        match &self.root {
            Some(root) => root.join(native.trim_start_matches(MAIN_SEPARATOR)),
            None => PathBuf::from(native),
        }
    }
}

impl Default for DiskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FileStore for DiskStore {
    /// 通常ファイルのみ存在扱い（ディレクトリは含まない）
    fn exists(&self, path: &str) -> bool {
        self.resolve(path).is_file()
    }

    fn create_dirs(&self, path: &str) -> Result<()> {
        let target = self.resolve(path);
        if !target.is_dir() {
            fs::create_dir_all(&target).map_err(|e| VfsError::io(path, e))?;
        }
        Ok(())
    }

    fn touch(&self, path: &str) -> Result<()> {
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.resolve(path))
            .map_err(|e| VfsError::io(path, e))?;
        Ok(())
    }

    fn open_read(&self, path: &str) -> Result<Box<dyn Read + Send>> {
        let file = File::open(self.resolve(path)).map_err(|e| VfsError::io(path, e))?;
        Ok(Box::new(BufReader::new(file)))
    }

    fn open_truncate(&self, path: &str) -> Result<Box<dyn Write + Send>> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.resolve(path))
            .map_err(|e| VfsError::io(path, e))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

/// リーダーからバッファが埋まるかEOFまで読み込む
pub fn read_into(reader: &mut dyn Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
