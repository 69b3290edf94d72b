use crate::error::{ArchiveError, Error};
use crate::extraction::*;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Create a ZIP archive with the given entries; names ending in `/` become directories
fn create_zip_archive(archive_path: &Path, entries: &[(&str, &[u8])]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut writer = ::zip::ZipWriter::new(file);
    let options =
        ::zip::write::FileOptions::default().compression_method(::zip::CompressionMethod::Stored);
    for (name, content) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(content).unwrap();
        }
    }
    writer.finish().unwrap();
}

/// Build a tar header whose name is written verbatim, bypassing the builder's path checks
fn raw_header(name: &str, entry_type: tar::EntryType, size: u64) -> tar::Header {
    let mut header = tar::Header::new_old();
    let bytes = name.as_bytes();
    header.as_old_mut().name[..bytes.len()].copy_from_slice(bytes);
    header.set_entry_type(entry_type);
    header.set_size(size);
    header.set_mode(0o644);
    header.set_cksum();
    header
}

enum TarEntry<'a> {
    Dir(&'a str),
    File(&'a str, &'a [u8]),
    Symlink(&'a str, &'a str),
}

/// Create a gzip-compressed tarball with the given entries
fn create_tar_gz(archive_path: &Path, entries: &[TarEntry<'_>]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for entry in entries {
        match entry {
            TarEntry::Dir(name) => {
                let header = raw_header(name, tar::EntryType::Directory, 0);
                builder.append(&header, std::io::empty()).unwrap();
            }
            TarEntry::File(name, content) => {
                let header = raw_header(name, tar::EntryType::Regular, content.len() as u64);
                builder.append(&header, *content).unwrap();
            }
            TarEntry::Symlink(name, link_target) => {
                let mut header = raw_header(name, tar::EntryType::Symlink, 0);
                header.set_link_name(link_target).unwrap();
                header.set_cksum();
                builder.append(&header, std::io::empty()).unwrap();
            }
        }
    }
    builder.into_inner().unwrap().finish().unwrap();
}

fn create_gz(archive_path: &Path, content: &[u8]) {
    let file = std::fs::File::create(archive_path).unwrap();
    let mut encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap();
}

/// Gzip-compress `content` as one member
fn gz_member(content: &[u8]) -> Vec<u8> {
    let mut encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(content).unwrap();
    encoder.finish().unwrap()
}

/// Every regular file under `root`, relative to it
fn files_under(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().strip_prefix(root).unwrap().to_path_buf())
        .collect();
    files.sort();
    files
}

// ===========================================================================
// target_dir
// ===========================================================================

#[test]
fn target_dir_uses_kind_specific_suffix() {
    assert_eq!(
        target_dir(Path::new("/out/tool.tar.gz")),
        Some(PathBuf::from("/out/tool-tar-gz"))
    );
    assert_eq!(
        target_dir(Path::new("/out/tool.gz")),
        Some(PathBuf::from("/out/tool-gz"))
    );
    assert_eq!(
        target_dir(Path::new("/out/tool.zip")),
        Some(PathBuf::from("/out/tool-zip"))
    );
    assert_eq!(
        target_dir(Path::new("/out/TOOL.TAR.GZ")),
        Some(PathBuf::from("/out/TOOL-tar-gz"))
    );
}

#[test]
fn target_dir_is_none_for_unsupported_files() {
    assert_eq!(target_dir(Path::new("/out/tool.exe")), None);
    assert_eq!(target_dir(Path::new("/out/tool.tar")), None);
    assert_eq!(target_dir(Path::new("/out/checksums")), None);
}

#[test]
fn same_stem_different_kinds_never_collide() {
    let gz = target_dir(Path::new("/out/tool.gz")).unwrap();
    let tgz = target_dir(Path::new("/out/tool.tar.gz")).unwrap();
    let zip = target_dir(Path::new("/out/tool.zip")).unwrap();
    assert_ne!(gz, tgz);
    assert_ne!(gz, zip);
    assert_ne!(tgz, zip);
}

// ===========================================================================
// Dispatch
// ===========================================================================

#[test]
fn unsupported_extension_is_a_noop() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tool.exe");
    std::fs::write(&path, b"binary").unwrap();

    let result = extract_blocking(&path).unwrap();
    assert_eq!(result, None);

    let entries: Vec<_> = std::fs::read_dir(temp_dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1, "no directory should have been created");
}

#[test]
fn gzip_expands_to_file_named_after_target_dir() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tool-v1.gz");
    create_gz(&path, b"#!/bin/sh\necho hi\n");

    let target = extract_blocking(&path).unwrap().unwrap();
    assert_eq!(target, temp_dir.path().join("tool-v1-gz"));

    let expanded = target.join("tool-v1-gz");
    assert_eq!(std::fs::read(expanded).unwrap(), b"#!/bin/sh\necho hi\n");
    assert_eq!(files_under(&target), vec![PathBuf::from("tool-v1-gz")]);
}

#[test]
fn gzip_decodes_every_member() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("data.gz");
    let mut bytes = gz_member(b"first-");
    bytes.extend(gz_member(b"second"));
    std::fs::write(&path, bytes).unwrap();

    let target = extract_blocking(&path).unwrap().unwrap();

    assert_eq!(
        std::fs::read(target.join("data-gz")).unwrap(),
        b"first-second"
    );
}

#[test]
fn tar_gz_split_across_members_unpacks_fully() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bundle.tar.gz");

    let mut builder = tar::Builder::new(Vec::new());
    for (name, content) in [("a.txt", &b"alpha"[..]), ("b.txt", &b"beta"[..])] {
        let header = raw_header(name, tar::EntryType::Regular, content.len() as u64);
        builder.append(&header, content).unwrap();
    }
    let tar_bytes = builder.into_inner().unwrap();

    // First entry is one 512-byte header plus one padded data block
    let (head, tail) = tar_bytes.split_at(1024);
    let mut bytes = gz_member(head);
    bytes.extend(gz_member(tail));
    std::fs::write(&path, bytes).unwrap();

    let target = extract_blocking(&path).unwrap().unwrap();

    assert_eq!(
        files_under(&target),
        vec![PathBuf::from("a.txt"), PathBuf::from("b.txt")]
    );
    assert_eq!(std::fs::read(target.join("b.txt")).unwrap(), b"beta");
}

#[test]
fn tar_gz_unpacks_directories_and_files() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tool.tar.gz");
    create_tar_gz(
        &path,
        &[
            TarEntry::Dir("tool/"),
            TarEntry::File("tool/bin/tool", b"ELF"),
            TarEntry::File("./README.md", b"docs"),
            TarEntry::Dir("tool/empty/"),
        ],
    );

    let target = extract_blocking(&path).unwrap().unwrap();
    assert_eq!(target, temp_dir.path().join("tool-tar-gz"));
    assert_eq!(std::fs::read(target.join("tool/bin/tool")).unwrap(), b"ELF");
    assert_eq!(std::fs::read(target.join("README.md")).unwrap(), b"docs");
    assert!(target.join("tool/empty").is_dir());
}

#[test]
fn zip_unpacks_directories_and_files() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tool.zip");
    create_zip_archive(
        &path,
        &[
            ("docs/", b""),
            ("docs/guide.txt", b"guide"),
            ("bin/tool.exe", b"MZ"),
        ],
    );

    let target = extract_blocking(&path).unwrap().unwrap();
    assert_eq!(target, temp_dir.path().join("tool-zip"));
    assert!(target.join("docs").is_dir());
    assert_eq!(std::fs::read(target.join("docs/guide.txt")).unwrap(), b"guide");
    assert_eq!(std::fs::read(target.join("bin/tool.exe")).unwrap(), b"MZ");
}

// ===========================================================================
// Idempotency
// ===========================================================================

#[test]
fn second_extraction_returns_existing_directory_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tool.zip");
    create_zip_archive(&path, &[("a.txt", b"original")]);

    let first = extract_blocking(&path).unwrap().unwrap();
    let before = files_under(&first);

    // Local edits survive because the archive is not unpacked again
    std::fs::write(first.join("a.txt"), b"edited").unwrap();

    let second = extract_blocking(&path).unwrap().unwrap();
    assert_eq!(first, second);
    assert_eq!(files_under(&second), before);
    assert_eq!(std::fs::read(second.join("a.txt")).unwrap(), b"edited");
}

#[tokio::test]
async fn async_wrapper_matches_blocking_result() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tool.tar.gz");
    create_tar_gz(&path, &[TarEntry::File("tool", b"bin")]);

    let target = extract_archive(&path).await.unwrap().unwrap();
    assert_eq!(std::fs::read(target.join("tool")).unwrap(), b"bin");

    let again = extract_archive(&path).await.unwrap().unwrap();
    assert_eq!(target, again);
}

// ===========================================================================
// Entry safety
// ===========================================================================

#[test]
fn entry_destination_rejects_traversal_and_absolute_paths() {
    let target = Path::new("/out/t");
    assert_eq!(entry_destination(target, Path::new("../x")), None);
    assert_eq!(entry_destination(target, Path::new("a/../../x")), None);
    assert_eq!(entry_destination(target, Path::new("/x")), None);
    assert_eq!(
        entry_destination(target, Path::new("a/./b")),
        Some(PathBuf::from("/out/t/a/b"))
    );
    // A literal ".." inside a name is not a traversal segment
    assert_eq!(
        entry_destination(target, Path::new("a..b")),
        Some(PathBuf::from("/out/t/a..b"))
    );
}

#[test]
fn tar_traversal_entries_are_skipped_and_rest_extracted() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let path = out.join("evil.tar.gz");
    create_tar_gz(
        &path,
        &[
            TarEntry::File("../escaped.txt", b"pwned"),
            TarEntry::File("ok/../../../escaped2.txt", b"pwned"),
            TarEntry::File("/tmp-absolute.txt", b"pwned"),
            TarEntry::File("safe.txt", b"fine"),
        ],
    );

    let target = extract_blocking(&path).unwrap().unwrap();

    assert_eq!(files_under(&target), vec![PathBuf::from("safe.txt")]);
    // Nothing but the archive and the extraction tree exists under the root
    let all = files_under(root.path());
    assert_eq!(
        all,
        vec![
            PathBuf::from("out/evil-tar-gz/safe.txt"),
            PathBuf::from("out/evil.tar.gz"),
        ]
    );
}

#[test]
fn zip_traversal_entries_are_skipped_and_rest_extracted() {
    let root = TempDir::new().unwrap();
    let out = root.path().join("out");
    std::fs::create_dir(&out).unwrap();
    let path = out.join("evil.zip");
    create_zip_archive(
        &path,
        &[("../escaped.txt", b"pwned"), ("nested/ok.txt", b"fine")],
    );

    let target = extract_blocking(&path).unwrap().unwrap();

    assert_eq!(files_under(&target), vec![PathBuf::from("nested/ok.txt")]);
    assert!(!root.path().join("escaped.txt").exists());
    assert!(!out.join("escaped.txt").exists());
}

#[test]
fn tar_symlink_entry_aborts_extraction_and_cleans_up() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("links.tar.gz");
    create_tar_gz(
        &path,
        &[
            TarEntry::File("first.txt", b"written before the failure"),
            TarEntry::Symlink("passwd", "/etc/passwd"),
        ],
    );

    let result = extract_blocking(&path);
    match result {
        Err(Error::Archive(ArchiveError::UnsupportedEntry { entry, kind, .. })) => {
            assert_eq!(entry, "passwd");
            assert!(kind.contains("Symlink"), "got kind {kind}");
        }
        other => panic!("expected UnsupportedEntry, got {other:?}"),
    }
    assert!(
        !temp_dir.path().join("links-tar-gz").exists(),
        "partial extraction directory must be removed"
    );
}

// ===========================================================================
// Corrupt input
// ===========================================================================

#[test]
fn corrupt_gzip_is_an_archive_error_without_leftovers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.gz");
    std::fs::write(&path, b"this is not gzip data").unwrap();

    let result = extract_blocking(&path);
    assert!(
        matches!(result, Err(Error::Archive(ArchiveError::Corrupt { .. }))),
        "got {result:?}"
    );
    assert!(!temp_dir.path().join("broken-gz").exists());
}

#[test]
fn truncated_tar_gz_is_an_archive_error_without_leftovers() {
    let temp_dir = TempDir::new().unwrap();
    let good = temp_dir.path().join("good.tar.gz");
    create_tar_gz(&good, &[TarEntry::File("big.bin", &[7u8; 64 * 1024])]);
    let bytes = std::fs::read(&good).unwrap();

    let path = temp_dir.path().join("truncated.tar.gz");
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let result = extract_blocking(&path);
    assert!(matches!(result, Err(Error::Archive(_))), "got {result:?}");
    assert!(!temp_dir.path().join("truncated-tar-gz").exists());
}

#[test]
fn corrupt_zip_is_an_archive_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("corrupt.zip");
    std::fs::write(&path, b"not a zip file at all").unwrap();

    match extract_blocking(&path) {
        Err(Error::Archive(ArchiveError::Corrupt { archive, reason })) => {
            assert_eq!(archive, path);
            assert!(
                reason.contains("failed to read ZIP archive"),
                "reason should describe the failure, got: {reason}"
            );
        }
        other => panic!("expected Corrupt, got: {other:?}"),
    }
    assert!(!temp_dir.path().join("corrupt-zip").exists());
}

#[test]
fn missing_archive_is_an_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let result = extract_blocking(&temp_dir.path().join("absent.zip"));
    assert!(matches!(result, Err(Error::Io(_))), "got {result:?}");
}
