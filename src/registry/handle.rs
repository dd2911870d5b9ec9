//! ファイルハンドル
//!
//! レジストリが所有するエントリと、呼び出し側に渡す不透明なトークン

use std::fmt;

/// アクセスモード（ハンドルの生存期間中は変化しない）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileMode {
    /// `open` で作成される読み込み専用ハンドル
    ReadOnly,
    /// `create` で作成される書き込み専用ハンドル
    WriteOnly,
}

impl fmt::Display for FileMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileMode::ReadOnly => write!(f, "readonly"),
            FileMode::WriteOnly => write!(f, "writeonly"),
        }
    }
}

/// ハンドル識別子
///
/// レジストリ内で単調増加し、再利用されない。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub(crate) u64);

/// 呼び出し側に渡されるハンドル
///
/// 実体はレジストリが所有し、これは識別子だけを持つ。
/// 同一性は識別子の一致で判定する（同じパスでも別ハンドルなら不一致）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileHandle {
    id: HandleId,
}

impl FileHandle {
    pub(crate) fn new(id: HandleId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }
}

impl fmt::Display for FileHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id.0)
    }
}

/// レジストリ内部のエントリ
#[derive(Debug, Clone)]
pub(crate) struct HandleEntry {
    pub id: HandleId,
    pub path: String,
    pub mode: FileMode,
}

impl HandleEntry {
    pub fn handle(&self) -> FileHandle {
        FileHandle::new(self.id)
    }
}
