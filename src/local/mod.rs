// src/local/mod.rs
// =============================================================================
// Local backend: reads the device-type library from a git working copy.
//
// Same two operations as the GitHub backend, answered from disk instead:
// - enumerate_tree walks `<dest>/<path>` and hashes each model file
// - fetch_files looks the requested hashes up in the object database
//
// Creating a `LocalGitSource` touches nothing. Call `sync()` to clone the
// repository (first time) and pull the latest commits before reading.
// =============================================================================

mod scan;
mod sync;

use crate::config::LocalConfig;
use crate::error::Result;
use crate::source::{DeviceTypeSource, FileContents, QuerySelection, Tree};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::debug;

/// Local git working copy backend.
#[derive(Debug, Clone)]
pub struct LocalGitSource {
    config: LocalConfig,
}

impl LocalGitSource {
    pub fn new(config: LocalConfig) -> Self {
        Self { config }
    }

    /// Folder whose subdirectories are the vendors.
    pub fn tree_root(&self) -> PathBuf {
        self.config.dest_path.join(&self.config.path)
    }

    /// Clone into `dest_path` if it doesn't exist yet, then pull `origin`.
    /// Safe to call again; an up-to-date copy is left alone.
    pub async fn sync(&self) -> Result<()> {
        let config = self.config.clone();
        tokio::task::spawn_blocking(move || sync::sync_working_copy(&config)).await?
    }
}

#[async_trait]
impl DeviceTypeSource for LocalGitSource {
    async fn enumerate_tree(&self) -> Result<Tree> {
        let root = self.tree_root();
        let tree = tokio::task::spawn_blocking(move || scan::scan_tree(&root)).await??;
        debug!(vendors = tree.len(), "Enumerated local tree");
        Ok(tree)
    }

    async fn fetch_files(&self, selection: &QuerySelection) -> Result<FileContents> {
        if selection.is_empty() {
            return Ok(FileContents::new());
        }

        let repo_path = self.config.dest_path.clone();
        let selection = selection.clone();
        let contents =
            tokio::task::spawn_blocking(move || scan::read_blobs(&repo_path, &selection)).await??;
        debug!(received = contents.len(), "Read files from local repository");
        Ok(contents)
    }

    fn source_name(&self) -> &'static str {
        "local"
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is spawn_blocking?
//    - git2 and std::fs block the thread until they finish
//    - Doing that on a tokio worker would stall every other task on it
//    - spawn_blocking runs the closure on a separate thread pool and gives
//      back a future we can .await
//
// 2. Why the double `??`?
//    - The first ? unwraps the JoinError (the blocking task panicked)
//    - The second ? unwraps our own FetchError from inside the closure
// -----------------------------------------------------------------------------
