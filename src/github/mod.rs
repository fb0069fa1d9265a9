// src/github/mod.rs
// =============================================================================
// GitHub backend: reads the device-type library through the GraphQL API.
//
// Submodules:
// - query: builds the tree and files GraphQL documents
// - response: typed views of what comes back
// - fetch: the HTTP client and the `DeviceTypeSource` impl
// =============================================================================

mod fetch;
mod query;
mod response;

pub use fetch::GithubSource;
pub use query::{files_query, tree_query, GraphQlQuery, ALIAS_PREFIX};
