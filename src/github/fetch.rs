// src/github/fetch.rs
// =============================================================================
// Reads the device-type tree and file contents through GitHub's GraphQL API.
//
// Strategy:
// - One POST lists the whole two-level tree (vendors -> models with blob ids)
// - One POST fetches every requested file, each as an aliased sub-query
// - The token rides along on every request as `Authorization: token <token>`
//
// Nothing is cached between calls and nothing is retried. Whatever GitHub
// says goes straight back to the caller as a `FetchError::Query`.
// =============================================================================

use super::query::{files_query, tree_query, GraphQlQuery};
use super::response::{FilesData, TreeData};
use crate::config::GithubConfig;
use crate::error::{FetchError, Result};
use crate::source::{DeviceTypeSource, FileContents, QuerySelection, Tree};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// GitHub GraphQL backend.
pub struct GithubSource {
    client: Client,
    url: Url,
    config: GithubConfig,
}

impl GithubSource {
    // Builds the HTTP client once; every query reuses it.
    //
    // Fails if the endpoint URL doesn't parse or the token contains bytes
    // that can't go in a header.
    pub fn new(config: GithubConfig) -> Result<Self> {
        let url = config.validate()?;

        let mut auth = HeaderValue::from_str(&format!("token {}", config.token)).map_err(|_| {
            FetchError::InvalidConfig {
                message: "token contains characters not allowed in an HTTP header".to_string(),
            }
        })?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            url,
            config,
        })
    }

    // Sends one GraphQL document and hands back the decoded JSON body.
    //
    // Returns: the whole body (`data` and all) when GitHub answered cleanly.
    // See `check_response` for what counts as a failure.
    pub async fn get_query(&self, query: &GraphQlQuery) -> Result<Value> {
        debug!(url = %self.url, variables = ?query.variables, "Sending GraphQL query");

        let response = self
            .client
            .post(self.url.clone())
            .json(query)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        check_response(status, &text)
    }
}

#[async_trait]
impl DeviceTypeSource for GithubSource {
    async fn enumerate_tree(&self) -> Result<Tree> {
        let query = tree_query(
            &self.config.owner,
            &self.config.repo,
            &self.config.branch,
            &self.config.path,
        );
        let body = self.get_query(&query).await?;

        let tree = match body.get("data") {
            Some(data) if !data.is_null() => {
                serde_json::from_value::<TreeData>(data.clone())?.into_tree()
            }
            _ => Tree::new(),
        };

        debug!(vendors = tree.len(), "Enumerated GitHub tree");
        Ok(tree)
    }

    async fn fetch_files(&self, selection: &QuerySelection) -> Result<FileContents> {
        if selection.is_empty() {
            return Ok(FileContents::new());
        }

        let query = files_query(
            &self.config.owner,
            &self.config.repo,
            &self.config.branch,
            &self.config.path,
            selection,
        )?;
        let body = self.get_query(&query).await?;

        let data = match body.get("data") {
            Some(data) if !data.is_null() => serde_json::from_value::<FilesData>(data.clone())?,
            _ => FilesData::default(),
        };
        let contents = data.into_contents(selection)?;

        debug!(requested = selection.len(), received = contents.len(), "Fetched files from GitHub");
        Ok(contents)
    }

    fn source_name(&self) -> &'static str {
        "github"
    }
}

// Decides whether a GraphQL response is usable.
//
// Checked in this order:
//   1. body isn't JSON           -> Query error, message = the raw body
//   2. body has an `errors` list -> Query error, message = first error only
//   3. HTTP status isn't 2xx     -> Query error, message = body's `message`
fn check_response(status: StatusCode, text: &str) -> Result<Value> {
    let body: Value = serde_json::from_str(text).map_err(|_| FetchError::query(text))?;

    if let Some(errors) = body.get("errors").and_then(Value::as_array) {
        if let Some(first) = errors.first() {
            if errors.len() > 1 {
                warn!(dropped = errors.len() - 1, "GraphQL returned several errors, reporting the first");
            }
            return Err(FetchError::Query {
                message: first.get("message").and_then(Value::as_str).map(str::to_string),
            });
        }
    }

    if !status.is_success() {
        return Err(FetchError::Query {
            message: body.get("message").and_then(Value::as_str).map(str::to_string),
        });
    }

    Ok(body)
}
