// src/source.rs
// =============================================================================
// The contract every backend implements, and the data it hands back.
//
// A device-type library is laid out as `<root>/<vendor>/<model>.yaml`. Callers
// first ask for the whole tree (vendor -> model -> content hash), compare it
// with whatever they imported last time, then ask for the contents of just
// the files whose hash changed.
// =============================================================================

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What we know about one model file without reading it: its git blob id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelRecord {
    pub sha: String,
}

impl ModelRecord {
    pub fn new(sha: impl Into<String>) -> Self {
        Self { sha: sha.into() }
    }
}

/// vendor name -> model file name -> record
pub type Tree = BTreeMap<String, BTreeMap<String, ModelRecord>>;

/// content hash -> `vendor/model` path relative to the library root
pub type QuerySelection = BTreeMap<String, String>;

/// content hash -> raw file text
pub type FileContents = BTreeMap<String, String>;

/// A place device-type files can be read from.
///
/// Both methods return fresh values owned by the caller. Neither retries:
/// a failure is returned as-is and nothing partial is handed back.
#[async_trait]
pub trait DeviceTypeSource: Send + Sync {
    /// List every vendor directory and the model files inside it.
    async fn enumerate_tree(&self) -> Result<Tree>;

    /// Read the files named in `selection`, keyed by the same hashes.
    ///
    /// An empty selection returns an empty map without touching the network
    /// or the disk.
    async fn fetch_files(&self, selection: &QuerySelection) -> Result<FileContents>;

    /// Short name used in logs.
    fn source_name(&self) -> &'static str;
}

/// Build a selection asking for every model in `tree`.
pub fn select_all(tree: &Tree) -> QuerySelection {
    tree.iter()
        .flat_map(|(vendor, models)| {
            models
                .iter()
                .map(move |(model, record)| (record.sha.clone(), format!("{}/{}", vendor, model)))
        })
        .collect()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - We hand backends around as `Box<dyn DeviceTypeSource>`
//    - Plain `async fn` in a trait can't be used through `dyn` yet
//    - The macro rewrites each method to return a boxed future, which `dyn` can hold
//
// 2. Why BTreeMap instead of HashMap?
//    - Keys come out sorted, so printed trees and JSON are stable run to run
// -----------------------------------------------------------------------------
