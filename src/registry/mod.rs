//! ハンドルレジストリ
//!
//! 現在オープンされている論理ファイルの集合を単一のロックで管理する。
//!
//! 排他ルール:
//! - `open`: 既存の ReadOnly ハンドルは共有、WriteOnly があれば失敗
//! - `create`: 既存の WriteOnly ハンドルを返す、ReadOnly があれば失敗
//!
//! ロックはレジストリの参照・更新の間だけ保持し、存在チェック、
//! ディレクトリ作成、バイト転送の間は保持しない。

mod handle;

pub use handle::{FileHandle, FileMode, HandleId};

use crate::config::VfsConfig;
use crate::error::{Result, VfsError};
use crate::file::io::{read_into, DiskStore, FileStore};
use crate::file::path::PathResolver;
use handle::HandleEntry;
use std::collections::HashMap;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct RegistryState {
    by_path: HashMap<String, HandleEntry>,
    paths: HashMap<HandleId, String>,
    next_id: u64,
}

impl RegistryState {
    fn insert(&mut self, path: &str, mode: FileMode) -> FileHandle {
        self.next_id += 1;
        let entry = HandleEntry {
            id: HandleId(self.next_id),
            path: path.to_string(),
            mode,
        };
        let handle = entry.handle();
        self.paths.insert(entry.id, entry.path.clone());
        self.by_path.insert(entry.path.clone(), entry);
        handle
    }

    fn entry(&self, handle: FileHandle) -> Option<&HandleEntry> {
        self.paths
            .get(&handle.id())
            .and_then(|path| self.by_path.get(path))
    }

    fn remove(&mut self, handle: FileHandle) -> Option<HandleEntry> {
        let path = self.paths.remove(&handle.id())?;
        self.by_path.remove(&path)
    }

    fn len(&self) -> usize {
        self.by_path.len()
    }
}

/// 既存エントリに対する要求モードの判定
///
/// 同じモードなら既存ハンドルを返し、異なるモードなら衝突。
fn resolve_existing(entry: &HandleEntry, requested: FileMode) -> Result<FileHandle> {
    if entry.mode == requested {
        Ok(entry.handle())
    } else {
        Err(VfsError::ModeConflict {
            path: entry.path.clone(),
            held: entry.mode,
            requested,
        })
    }
}

/// ハンドルレジストリ
pub struct Registry {
    state: Mutex<RegistryState>,
    store: Arc<dyn FileStore>,
    resolver: PathResolver,
}

impl Registry {
    /// 任意のストアでレジストリを作成
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self::with_resolver(store, PathResolver::default())
    }

    /// パス解決器を指定して作成
    pub fn with_resolver(store: Arc<dyn FileStore>, resolver: PathResolver) -> Self {
        Self {
            state: Mutex::new(RegistryState::default()),
            store,
            resolver,
        }
    }

    /// 設定からディスクベースのレジストリを作成
    pub fn from_config(config: &VfsConfig) -> Self {
        let mut store = DiskStore::new().with_separator(config.separator);
        if let Some(root) = &config.root {
            store = store.with_root(root);
        }
        Self::with_resolver(Arc::new(store), PathResolver::new(config.separator))
    }

    fn lock(&self) -> MutexGuard<'_, RegistryState> {
        // 状態の更新は単一の insert/remove のみなので、ポイズン後も整合している
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// ファイルシステム上にパスが存在するか（レジストリは参照しない）
    pub fn is_exist(&self, path: &str) -> bool {
        self.store.exists(path)
    }

    /// 追跡中のハンドル数
    pub fn size(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// 読み込み用にオープン
    pub fn open(&self, path: &str) -> Result<FileHandle> {
        // 存在チェックはロック外
        if !self.is_exist(path) {
            log::debug!("open {}: not found", path);
            return Err(VfsError::not_found(path));
        }

        let mut state = self.lock();
        if let Some(entry) = state.by_path.get(path) {
            let result = resolve_existing(entry, FileMode::ReadOnly);
            log::trace!("open {}: existing handle {}", path, entry.handle());
            return result;
        }

        let handle = state.insert(path, FileMode::ReadOnly);
        log::debug!("open {}: new readonly handle {}", path, handle);
        Ok(handle)
    }

    /// 書き込み用に作成
    pub fn create(&self, path: &str) -> Result<FileHandle> {
        {
            let state = self.lock();
            if let Some(entry) = state.by_path.get(path) {
                log::trace!("create {}: existing handle {}", path, entry.handle());
                return resolve_existing(entry, FileMode::WriteOnly);
            }
        }

        // ディレクトリとファイルの作成はロック外
        self.resolver.materialize(self.store.as_ref(), path)?;
        self.store.touch(path)?;

        let mut state = self.lock();
        // 二つのロック区間の間に同じパスが登録された場合も同じ規則を適用
        if let Some(entry) = state.by_path.get(path) {
            log::debug!("create {}: registered concurrently as {}", path, entry.handle());
            return resolve_existing(entry, FileMode::WriteOnly);
        }

        let handle = state.insert(path, FileMode::WriteOnly);
        log::debug!("create {}: new writeonly handle {}", path, handle);
        Ok(handle)
    }

    /// ハンドルを閉じる
    ///
    /// 未登録のハンドルは何もしない。削除した場合は `true`。
    /// ReadOnly ハンドルは共有されているため、全保持者に対して閉じられる。
    pub fn close(&self, handle: FileHandle) -> bool {
        let removed = self.lock().remove(handle);
        match &removed {
            Some(entry) => log::debug!("close {}: {}", handle, entry.path),
            None => log::debug!("close {}: not registered", handle),
        }
        removed.is_some()
    }

    /// ハンドルが登録されているか
    pub fn contains(&self, handle: FileHandle) -> bool {
        self.lock().entry(handle).is_some()
    }

    /// ハンドルのモード
    pub fn mode(&self, handle: FileHandle) -> Result<FileMode> {
        self.lock()
            .entry(handle)
            .map(|entry| entry.mode)
            .ok_or(VfsError::HandleNotRegistered { handle })
    }

    /// ハンドルのパス
    pub fn path(&self, handle: FileHandle) -> Result<String> {
        self.lock()
            .entry(handle)
            .map(|entry| entry.path.clone())
            .ok_or(VfsError::HandleNotRegistered { handle })
    }

    /// 追跡中パスの一覧（ソート済み）
    pub fn open_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.lock().by_path.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// モードと存在をロック下でチェックし、転送対象のパスを返す
    fn guard(&self, handle: FileHandle, required: FileMode) -> Result<String> {
        let state = self.lock();
        let entry = state
            .entry(handle)
            .ok_or(VfsError::HandleNotRegistered { handle })?;

        if entry.mode != required {
            return Err(VfsError::ModeConflict {
                path: entry.path.clone(),
                held: entry.mode,
                requested: required,
            });
        }

        if !self.store.exists(&entry.path) {
            return Err(VfsError::not_found(entry.path.clone()));
        }

        Ok(entry.path.clone())
    }

    /// ファイル先頭から `buf` に読み込む
    ///
    /// EOF か `buf.len()` バイトで停止し、読み込んだバイト数を返す。
    /// 転送はロック外で行う。
    pub fn read(&self, handle: FileHandle, buf: &mut [u8]) -> Result<usize> {
        let path = self.guard(handle, FileMode::ReadOnly)?;

        let mut reader = self.store.open_read(&path)?;
        let count = read_into(reader.as_mut(), buf).map_err(|e| VfsError::io(&path, e))?;
        log::trace!("read {} ({}): {} bytes", handle, path, count);
        Ok(count)
    }

    /// ファイルを切り詰めて `data` 全体を書き込む
    pub fn write(&self, handle: FileHandle, data: &[u8]) -> Result<usize> {
        let path = self.guard(handle, FileMode::WriteOnly)?;

        let mut writer = self.store.open_truncate(&path)?;
        writer
            .write_all(data)
            .and_then(|_| writer.flush())
            .map_err(|e| VfsError::io(&path, e))?;
        log::trace!("write {} ({}): {} bytes", handle, path, data.len());
        Ok(data.len())
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("size", &self.size())
            .field("resolver", &self.resolver)
            .finish()
    }
}
