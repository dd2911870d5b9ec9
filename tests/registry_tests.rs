// registry_tests.rs - ハンドルレジストリの公開APIテスト

use ivfs::file::DiskStore;
use ivfs::{ErrorKind, FileMode, Registry, VfsConfig, VfsError};
use std::fs;
use std::sync::Arc;
use tempfile::{tempdir, TempDir};

fn registry_in_tempdir() -> (TempDir, Registry) {
    let temp_dir = tempdir().unwrap();
    let registry = Registry::new(Arc::new(DiskStore::new().with_root(temp_dir.path())));
    (temp_dir, registry)
}

#[test]
fn test_is_exist_queries_filesystem_not_registry() {
    let (dir, registry) = registry_in_tempdir();

    assert!(!registry.is_exist("present.txt"));
    fs::write(dir.path().join("present.txt"), "x").unwrap();
    assert!(registry.is_exist("present.txt"));
    assert_eq!(registry.size(), 0);
}

#[test]
fn test_open_directory_is_not_found() {
    let (dir, registry) = registry_in_tempdir();
    fs::create_dir(dir.path().join("folder")).unwrap();

    assert!(!registry.is_exist("folder"));
    assert_eq!(registry.open("folder"), Err(VfsError::not_found("folder")));
    assert_eq!(registry.size(), 0);
}

#[test]
fn test_read_fails_when_file_removed() {
    let (dir, registry) = registry_in_tempdir();
    fs::write(dir.path().join("vanishing.txt"), "data").unwrap();

    let handle = registry.open("vanishing.txt").unwrap();
    fs::remove_file(dir.path().join("vanishing.txt")).unwrap();

    let mut buf = [0u8; 4];
    assert_eq!(
        registry.read(handle, &mut buf),
        Err(VfsError::not_found("vanishing.txt"))
    );
    assert_eq!(buf, [0u8; 4]);
    assert!(registry.contains(handle));
}

#[test]
fn test_absolute_logical_path_stays_under_root() {
    let (dir, registry) = registry_in_tempdir();

    let handle = registry.create("/nested/abs.txt").unwrap();
    registry.write(handle, b"rooted").unwrap();

    let on_disk = dir.path().join("nested").join("abs.txt");
    assert_eq!(fs::read_to_string(on_disk).unwrap(), "rooted");
}

#[test]
fn test_round_trip_create_write_close_open_read() {
    let (_dir, registry) = registry_in_tempdir();
    let data = b"file data";

    let writer = registry.create("FileFolder/File.txt").unwrap();
    assert_eq!(registry.write(writer, data).unwrap(), data.len());
    assert!(registry.close(writer));

    let reader = registry.open("FileFolder/File.txt").unwrap();
    let mut buf = [0u8; 9];
    assert_eq!(registry.read(reader, &mut buf).unwrap(), data.len());
    assert_eq!(&buf, data);
    registry.close(reader);
}

#[test]
fn test_read_returns_min_of_buffer_and_file_size() {
    let (dir, registry) = registry_in_tempdir();
    fs::write(dir.path().join("short.txt"), "abc").unwrap();

    let handle = registry.open("short.txt").unwrap();

    let mut large = [0u8; 16];
    assert_eq!(registry.read(handle, &mut large).unwrap(), 3);
    assert_eq!(&large[..3], b"abc");
    // 終端マーカーは書き込まない
    assert_eq!(large[3], 0);

    let mut small = [0u8; 2];
    assert_eq!(registry.read(handle, &mut small).unwrap(), 2);
    assert_eq!(&small, b"ab");
}

#[test]
fn test_write_on_read_handle_fails_and_leaves_file() {
    let (dir, registry) = registry_in_tempdir();
    fs::write(dir.path().join("keep.txt"), "original").unwrap();

    let handle = registry.open("keep.txt").unwrap();
    let error = registry.write(handle, b"overwrite").unwrap_err();

    assert_eq!(error.kind(), ErrorKind::ModeConflict);
    assert_eq!(
        fs::read_to_string(dir.path().join("keep.txt")).unwrap(),
        "original"
    );
}

#[test]
fn test_read_on_write_handle_fails() {
    let (_dir, registry) = registry_in_tempdir();
    let handle = registry.create("w.txt").unwrap();
    registry.write(handle, b"data").unwrap();

    let mut buf = [0u8; 4];
    match registry.read(handle, &mut buf) {
        Err(VfsError::ModeConflict { held, requested, .. }) => {
            assert_eq!(held, FileMode::WriteOnly);
            assert_eq!(requested, FileMode::ReadOnly);
        }
        other => panic!("Expected ModeConflict, got {:?}", other),
    }
    assert_eq!(buf, [0u8; 4]);
}

#[test]
fn test_write_always_truncates() {
    let (dir, registry) = registry_in_tempdir();
    let handle = registry.create("t.txt").unwrap();

    registry.write(handle, b"long content here").unwrap();
    registry.write(handle, b"tiny").unwrap();

    assert_eq!(fs::read_to_string(dir.path().join("t.txt")).unwrap(), "tiny");
}

#[test]
fn test_create_keeps_existing_content_until_write() {
    let (dir, registry) = registry_in_tempdir();
    fs::write(dir.path().join("old.txt"), "previous").unwrap();

    let handle = registry.create("old.txt").unwrap();
    assert_eq!(
        fs::read_to_string(dir.path().join("old.txt")).unwrap(),
        "previous"
    );

    registry.write(handle, b"").unwrap();
    assert_eq!(fs::read(dir.path().join("old.txt")).unwrap().len(), 0);
}

#[test]
fn test_size_accounting() {
    let (dir, registry) = registry_in_tempdir();
    fs::write(dir.path().join("r.txt"), "r").unwrap();

    let reader = registry.open("r.txt").unwrap();
    assert_eq!(registry.size(), 1);
    registry.open("r.txt").unwrap();
    assert_eq!(registry.size(), 1);

    let writer = registry.create("w.txt").unwrap();
    assert_eq!(registry.size(), 2);
    registry.create("w.txt").unwrap();
    assert_eq!(registry.size(), 2);

    registry.close(reader);
    assert_eq!(registry.size(), 1);
    registry.close(reader);
    assert_eq!(registry.size(), 1);
    registry.close(writer);
    assert!(registry.is_empty());
}

#[test]
fn test_close_shared_reader_closes_for_all_holders() {
    let (dir, registry) = registry_in_tempdir();
    fs::write(dir.path().join("s.txt"), "s").unwrap();

    let first = registry.open("s.txt").unwrap();
    let second = registry.open("s.txt").unwrap();
    registry.close(first);

    let mut buf = [0u8; 1];
    assert_eq!(
        registry.read(second, &mut buf),
        Err(VfsError::HandleNotRegistered { handle: second })
    );
}

#[test]
fn test_paths_are_matched_literally() {
    let (dir, registry) = registry_in_tempdir();
    fs::create_dir(dir.path().join("d")).unwrap();
    fs::write(dir.path().join("d").join("f.txt"), "x").unwrap();

    let plain = registry.open("d/f.txt").unwrap();
    let dotted = registry.open("./d/f.txt").unwrap();

    assert_ne!(plain, dotted);
    assert_eq!(registry.size(), 2);
}

#[test]
fn test_from_config_uses_root_and_separator() {
    let temp_dir = tempdir().unwrap();
    let config = VfsConfig::default()
        .with_root(temp_dir.path())
        .with_separator('\\');
    let registry = Registry::from_config(&config);

    let handle = registry.create("FileFolder\\File1.txt").unwrap();
    registry.write(handle, b"file data 1").unwrap();

    let on_disk = temp_dir.path().join("FileFolder").join("File1.txt");
    assert_eq!(fs::read_to_string(on_disk).unwrap(), "file data 1");
}
