// src/github/response.rs
// =============================================================================
// Typed views of the `data` part of the two GraphQL responses.
//
// Inline fragments (`... on Tree`, `... on Blob`) come back as an empty object
// when the fragment doesn't match, so every nested list or field here is
// optional and defaults to empty.
// =============================================================================

use super::query::ALIAS_PREFIX;
use crate::error::{FetchError, Result};
use crate::source::{FileContents, ModelRecord, QuerySelection, Tree};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
pub struct TreeData {
    #[serde(default)]
    repository: Option<TreeRepository>,
}

#[derive(Debug, Default, Deserialize)]
struct TreeRepository {
    #[serde(default)]
    object: Option<VendorListing>,
}

#[derive(Debug, Default, Deserialize)]
struct VendorListing {
    #[serde(default)]
    entries: Vec<VendorEntry>,
}

#[derive(Debug, Deserialize)]
struct VendorEntry {
    name: String,
    #[serde(default)]
    object: Option<ModelListing>,
}

#[derive(Debug, Default, Deserialize)]
struct ModelListing {
    #[serde(default)]
    entries: Vec<ModelEntry>,
}

#[derive(Debug, Deserialize)]
struct ModelEntry {
    name: String,
    oid: String,
}

impl TreeData {
    pub fn into_tree(self) -> Tree {
        let vendors = self
            .repository
            .and_then(|repo| repo.object)
            .map(|listing| listing.entries)
            .unwrap_or_default();

        let mut tree = Tree::new();
        for vendor in vendors {
            let models = tree.entry(vendor.name).or_default();
            for model in vendor.object.map(|o| o.entries).unwrap_or_default() {
                models.insert(model.name, ModelRecord::new(model.oid));
            }
        }
        tree
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FilesData {
    #[serde(default)]
    repository: Option<BTreeMap<String, Option<BlobObject>>>,
}

#[derive(Debug, Deserialize)]
struct BlobObject {
    #[serde(default)]
    text: Option<String>,
}

impl FilesData {
    /// Pick out the text for every hash in `selection` from the `sha_<hash>`
    /// aliases. A hash with no alias, a null object (path not on the branch)
    /// or null text (binary blob) fails the whole call, as does a missing
    /// `repository`.
    pub fn into_contents(self, selection: &QuerySelection) -> Result<FileContents> {
        let mut objects = self.repository.unwrap_or_default();

        let mut contents = FileContents::new();
        for sha in selection.keys() {
            let alias = format!("{}{}", ALIAS_PREFIX, sha);
            match objects.remove(&alias).flatten().and_then(|blob| blob.text) {
                Some(text) => {
                    contents.insert(sha.clone(), text);
                }
                None => return Err(FetchError::MissingBlob { sha: sha.clone() }),
            }
        }
        Ok(contents)
    }
}
