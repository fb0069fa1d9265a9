// src/local/scan.rs
// =============================================================================
// Blocking filesystem and object-database work for the local backend.
//
// Everything here runs on tokio's blocking pool; see `LocalGitSource`.
//
// Model files are hashed from their raw bytes. `git hash-object <path>` runs
// clean filters (`.gitattributes`, core.autocrlf) first, so on a working copy
// that rewrites line endings a hash from `scan_tree` may not exist in the
// object database, and `read_blobs` will reject it.
// =============================================================================

use crate::error::{FetchError, Result};
use crate::source::{FileContents, ModelRecord, QuerySelection, Tree};
use git2::{ObjectType, Oid, Repository};
use std::fs;
use std::path::Path;
use tracing::debug;

/// Walk `<root>/<vendor>/<model>` and hash every model file's raw bytes as
/// a git blob.
///
/// A missing `root` is an empty tree. Plain files directly under `root` are
/// ignored; anything that isn't a regular file one level further down is an
/// error.
pub fn scan_tree(root: &Path) -> Result<Tree> {
    let mut tree = Tree::new();
    if !root.exists() {
        debug!(root = %root.display(), "Device-type folder missing, returning empty tree");
        return Ok(tree);
    }

    for vendor in fs::read_dir(root)? {
        let vendor = vendor?;
        let vendor_path = vendor.path();
        if !vendor_path.is_dir() {
            continue;
        }

        let models = tree
            .entry(vendor.file_name().to_string_lossy().into_owned())
            .or_default();

        for model in fs::read_dir(&vendor_path)? {
            let model_path = model?.path();
            if !model_path.is_file() {
                return Err(FetchError::NotAFile { path: model_path });
            }
            let oid = Oid::hash_file(ObjectType::Blob, &model_path)?;
            let name = model_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            models.insert(name, ModelRecord::new(oid.to_string()));
        }
    }

    Ok(tree)
}

/// Look up each requested hash in the repository at `repo_path` and read it
/// as text. The first hash that doesn't name a blob fails the whole call.
///
/// Text is returned byte-for-byte (lossy UTF-8), trailing newline included,
/// the same as the GitHub backend's blob `text`. `git show` output piped
/// through tooling that trims it will differ by that final newline.
pub fn read_blobs(repo_path: &Path, selection: &QuerySelection) -> Result<FileContents> {
    let repo = Repository::open(repo_path)?;

    let mut contents = FileContents::new();
    for sha in selection.keys() {
        let blob = repo
            .revparse_single(sha)
            .and_then(|object| object.peel_to_blob())
            .map_err(|_| FetchError::InvalidSha { sha: sha.clone() })?;
        contents.insert(sha.clone(), String::from_utf8_lossy(blob.content()).into_owned());
    }

    Ok(contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_hashes_like_git() {
        let dir = tempfile::tempdir().unwrap();
        let acme = dir.path().join("Acme");
        fs::create_dir(&acme).unwrap();
        fs::write(acme.join("widget.yaml"), "hello\n").unwrap();

        let tree = scan_tree(dir.path()).unwrap();
        // `echo hello | git hash-object --stdin`
        assert_eq!(
            tree["Acme"]["widget.yaml"].sha,
            "ce013625030ba8dba906f756967f9e9ca394464a"
        );
    }

    #[test]
    fn test_scan_skips_files_at_vendor_level() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("README.md"), "docs").unwrap();
        fs::create_dir(dir.path().join("Acme")).unwrap();
        fs::create_dir(dir.path().join("Empty")).unwrap();
        fs::write(dir.path().join("Acme").join("a.yaml"), "a: 1\n").unwrap();

        let tree = scan_tree(dir.path()).unwrap();
        assert_eq!(tree.len(), 2);
        assert!(!tree.contains_key("README.md"));
        assert_eq!(tree["Acme"].len(), 1);
        assert!(tree["Empty"].is_empty());
    }

    #[test]
    fn test_scan_missing_root() {
        let dir = tempfile::tempdir().unwrap();
        let tree = scan_tree(&dir.path().join("device-types")).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn test_scan_rejects_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("Acme").join("nested");
        fs::create_dir_all(&nested).unwrap();

        let err = scan_tree(dir.path()).unwrap_err();
        assert!(err.is_value_error());
        assert!(matches!(err, FetchError::NotAFile { path } if path == nested));
    }

    #[test]
    fn test_scan_hashes_raw_bytes_without_line_ending_filters() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let acme = dir.path().join("device-types").join("Acme");
        fs::create_dir_all(&acme).unwrap();
        fs::write(acme.join("widget.yaml"), b"model: Widget\r\n").unwrap();

        let tree = scan_tree(&dir.path().join("device-types")).unwrap();
        let raw = repo.blob(b"model: Widget\r\n").unwrap();
        assert_eq!(tree["Acme"]["widget.yaml"].sha, raw.to_string());
    }

    #[test]
    fn test_read_blobs_keeps_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        let oid = repo.blob(b"model: Widget\n").unwrap().to_string();

        let mut selection = QuerySelection::new();
        selection.insert(oid.clone(), "Acme/widget.yaml".to_string());

        let contents = read_blobs(dir.path(), &selection).unwrap();
        assert_eq!(contents[&oid], "model: Widget\n");
    }
}
