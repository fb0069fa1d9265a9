// src/lib.rs
// =============================================================================
// devicetype-fetch: list and read device-type definition files from either
// GitHub (GraphQL) or a local git clone, behind one `DeviceTypeSource` trait.
// =============================================================================

pub mod config;
pub mod error;
pub mod github;
pub mod local;
pub mod source;

pub use config::{open_source, GithubConfig, LocalConfig, SourceConfig};
pub use error::{FetchError, Result};
pub use github::GithubSource;
pub use local::LocalGitSource;
pub use source::{select_all, DeviceTypeSource, FileContents, ModelRecord, QuerySelection, Tree};
