//! Integration tests for the replicator and comparator together.

use filetime::FileTime;
use photo_filekit::api::{self, Toolkit};
use photo_filekit::core::comparator::{compare_files, CompareResult};
use photo_filekit::core::fingerprint::FingerprintMode;
use photo_filekit::core::replicator::{Replicator, StreamCopy, TransferBackend, TransferMethod};
use photo_filekit::ErrorKind;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn patterned(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 7 % 253) as u8).collect()
}

fn write_file(dir: &TempDir, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, data).unwrap();
    path
}

#[test]
fn copy_then_compare_is_equal() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "IMG_0001.jpg", &patterned(3 * 1024 * 1024 + 17));
    let dst = dir.path().join("backup.jpg");

    let outcome = api::copy_file(&src, &dst);
    assert!(outcome.ok, "copy failed: {:?}", outcome.error_message);
    assert_eq!(outcome.bytes_copied, 3 * 1024 * 1024 + 17);
    assert!(outcome.method.is_some());

    assert_eq!(compare_files(&src, &dst).unwrap(), CompareResult::Equal);
    assert_eq!(
        api::get_fingerprint(&src, FingerprintMode::Full).unwrap(),
        api::get_fingerprint(&dst, FingerprintMode::Full).unwrap()
    );
}

#[test]
fn copy_preserves_timestamps() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "old.jpg", b"taken years ago");
    let mtime = FileTime::from_unix_time(1_262_304_000, 0);
    filetime::set_file_mtime(&src, mtime).unwrap();

    let dst = dir.path().join("copy.jpg");
    let report = Replicator::new().copy(&src, &dst).unwrap();
    assert_eq!(report.bytes_copied, 15);

    let meta = fs::metadata(&dst).unwrap();
    assert_eq!(FileTime::from_last_modification_time(&meta), mtime);
}

#[test]
fn stream_only_chain_copies() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "a.bin", &patterned(100_000));
    let dst = dir.path().join("b.bin");

    let backends: Vec<Box<dyn TransferBackend>> = vec![Box::new(StreamCopy)];
    let toolkit = Toolkit::default().with_replicator(Replicator::with_backends(backends));
    let outcome = toolkit.copy_file(&src, &dst);

    assert!(outcome.ok);
    assert_eq!(compare_files(&src, &dst).unwrap(), CompareResult::Equal);
}

#[test]
fn empty_file_copies() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "empty.jpg", b"");
    let dst = dir.path().join("empty-copy.jpg");

    let outcome = api::copy_file(&src, &dst);
    assert!(outcome.ok);
    assert_eq!(outcome.bytes_copied, 0);
    assert_eq!(outcome.method, Some(TransferMethod::Empty));
    assert_eq!(compare_files(&src, &dst).unwrap(), CompareResult::Equal);
}

#[test]
fn existing_destination_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let src = write_file(&dir, "a.jpg", b"new content");
    let dst = write_file(&dir, "b.jpg", b"precious");

    let err = Replicator::new().copy(&src, &dst).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyExists);
    assert_eq!(fs::read(&dst).unwrap(), b"precious");
}

#[test]
fn missing_source_creates_nothing() {
    let dir = TempDir::new().unwrap();
    let dst = dir.path().join("never.jpg");

    let outcome = api::copy_file(dir.path().join("missing.jpg"), &dst);
    assert!(!outcome.ok);
    assert!(outcome.error_message.is_some());
    assert!(!dst.exists());
}

#[test]
fn compare_detects_size_and_content() {
    let dir = TempDir::new().unwrap();
    let a = write_file(&dir, "a.bin", &patterned(70_000));
    let mut tail = patterned(70_000);
    tail[69_999] ^= 0xFF;
    let b = write_file(&dir, "b.bin", &tail);
    let c = write_file(&dir, "c.bin", &patterned(70_001));

    assert_eq!(compare_files(&a, &b).unwrap(), CompareResult::DifferentContent);
    assert_eq!(compare_files(&a, &c).unwrap(), CompareResult::DifferentSize);
    assert_eq!(compare_files(&a, &a).unwrap(), CompareResult::Equal);
}
