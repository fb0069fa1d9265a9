// src/github/query.rs
// =============================================================================
// Builds the two GraphQL documents the GitHub backend sends.
//
// Owner, repository, branch and paths all come from the caller, so none of
// them are pasted into the query text. They travel in `variables` and GitHub
// does the quoting. The only caller-supplied text that ends up inside the
// document is the hash used to build each `sha_<hash>` alias, and that is
// checked against the GraphQL name grammar first.
// =============================================================================

use crate::error::{FetchError, Result};
use crate::source::QuerySelection;
use serde::Serialize;
use serde_json::{Map, Value};

/// Every files-query alias is the requested hash with this in front.
pub const ALIAS_PREFIX: &str = "sha_";

const TREE_QUERY: &str = r#"query($owner: String!, $name: String!, $expression: String!) {
  repository(owner: $owner, name: $name) {
    object(expression: $expression) {
      ... on Tree {
        entries {
          name
          type
          object {
            ... on Tree {
              entries {
                name
                type
                oid
              }
            }
          }
        }
      }
    }
  }
}
"#;

/// The JSON body POSTed to the GraphQL endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct GraphQlQuery {
    pub query: String,
    pub variables: Map<String, Value>,
}

impl GraphQlQuery {
    fn new(query: String, owner: &str, repo: &str) -> Self {
        let mut variables = Map::new();
        variables.insert("owner".to_string(), Value::from(owner));
        variables.insert("name".to_string(), Value::from(repo));
        Self { query, variables }
    }
}

/// Two-level listing of `branch:path`: vendor directories and the entries
/// directly inside each one.
pub fn tree_query(owner: &str, repo: &str, branch: &str, path: &str) -> GraphQlQuery {
    let mut query = GraphQlQuery::new(TREE_QUERY.to_string(), owner, repo);
    query
        .variables
        .insert("expression".to_string(), Value::from(expression(branch, path)));
    query
}

/// One aliased `object(expression:)` lookup per requested hash, all inside a
/// single `repository` selection.
pub fn files_query(
    owner: &str,
    repo: &str,
    branch: &str,
    root_path: &str,
    selection: &QuerySelection,
) -> Result<GraphQlQuery> {
    let mut params = vec!["$owner: String!".to_string(), "$name: String!".to_string()];
    let mut objects = String::new();
    let mut expressions = Vec::with_capacity(selection.len());

    for (index, (sha, relative_path)) in selection.iter().enumerate() {
        if !is_alias_safe(sha) {
            return Err(FetchError::InvalidSelectionKey { key: sha.clone() });
        }
        let var = format!("e{}", index);
        params.push(format!("${}: String!", var));
        objects.push_str(&format!(
            "    {prefix}{sha}: object(expression: ${var}) {{\n      ... on Blob {{\n        text\n      }}\n    }}\n",
            prefix = ALIAS_PREFIX,
            sha = sha,
            var = var,
        ));
        expressions.push((var, file_expression(branch, root_path, relative_path)));
    }

    let text = format!(
        "query({}) {{\n  repository(owner: $owner, name: $name) {{\n{}  }}\n}}\n",
        params.join(", "),
        objects
    );

    let mut query = GraphQlQuery::new(text, owner, repo);
    for (var, expr) in expressions {
        query.variables.insert(var, Value::from(expr));
    }
    Ok(query)
}

/// `branch:path`, the revision syntax `object(expression:)` understands.
pub fn expression(branch: &str, path: &str) -> String {
    format!("{}:{}", branch, path.trim_matches('/'))
}

fn file_expression(branch: &str, root_path: &str, relative_path: &str) -> String {
    let root = root_path.trim_matches('/');
    let relative = relative_path.trim_start_matches('/');
    if root.is_empty() {
        expression(branch, relative)
    } else {
        expression(branch, &format!("{}/{}", root, relative))
    }
}

// The prefix already supplies a leading letter, so the hash only needs to be
// made of name-continue characters.
fn is_alias_safe(key: &str) -> bool {
    !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
