// src/config.rs
// =============================================================================
// Connection settings for each backend, and the one place that turns settings
// into a ready-to-use `DeviceTypeSource`.
//
// The defaults point at the public device-type library
// (netbox-community/devicetype-library, branch `master`, folder
// `device-types`), so most callers only need to supply a token or a clone
// location.
// =============================================================================

use crate::error::{FetchError, Result};
use crate::github::GithubSource;
use crate::local::LocalGitSource;
use crate::source::DeviceTypeSource;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use url::Url;

pub const DEFAULT_GRAPHQL_URL: &str = "https://api.github.com/graphql";
pub const DEFAULT_OWNER: &str = "netbox-community";
pub const DEFAULT_REPO: &str = "devicetype-library";
pub const DEFAULT_BRANCH: &str = "master";
pub const DEFAULT_PATH: &str = "device-types";

/// Settings for the GitHub GraphQL backend.
#[derive(Clone)]
pub struct GithubConfig {
    /// GraphQL endpoint
    pub url: String,
    /// Sent as `Authorization: token <token>`
    pub token: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Folder holding the vendor directories, relative to the repo root
    pub path: String,
    /// Per-request timeout; `None` waits forever
    pub timeout: Option<Duration>,
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_GRAPHQL_URL.to_string(),
            token: String::new(),
            owner: DEFAULT_OWNER.to_string(),
            repo: DEFAULT_REPO.to_string(),
            branch: DEFAULT_BRANCH.to_string(),
            path: DEFAULT_PATH.to_string(),
            timeout: None,
        }
    }
}

// Hand-written so the token never ends up in a log line.
impl fmt::Debug for GithubConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubConfig")
            .field("url", &self.url)
            .field("token", &"<redacted>")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("path", &self.path)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GithubConfig {
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    pub fn with_repository(mut self, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        self.owner = owner.into();
        self.repo = repo.into();
        self
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parse the endpoint and check the repository coordinates are filled in.
    pub fn validate(&self) -> Result<Url> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(FetchError::InvalidConfig {
                message: "GitHub owner and repository are required".to_string(),
            });
        }
        if self.branch.is_empty() {
            return Err(FetchError::InvalidConfig {
                message: "branch is required".to_string(),
            });
        }
        Url::parse(&self.url).map_err(|e| FetchError::InvalidConfig {
            message: format!("invalid GraphQL URL '{}': {}", self.url, e),
        })
    }
}

/// Settings for the local clone backend.
#[derive(Debug, Clone)]
pub struct LocalConfig {
    /// Anything libgit2 can clone from: a URL or a filesystem path
    pub repo_uri: String,
    /// Where the working copy lives (or will be cloned to)
    pub dest_path: PathBuf,
    pub branch: String,
    /// Folder holding the vendor directories, relative to the working copy
    pub path: PathBuf,
}

impl LocalConfig {
    pub fn new(repo_uri: impl Into<String>, dest_path: impl Into<PathBuf>) -> Self {
        Self {
            repo_uri: repo_uri.into(),
            dest_path: dest_path.into(),
            branch: DEFAULT_BRANCH.to_string(),
            path: PathBuf::from(DEFAULT_PATH),
        }
    }

    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.dest_path.as_os_str().is_empty() {
            return Err(FetchError::InvalidConfig {
                message: "destination path is required".to_string(),
            });
        }
        // A URI is only needed when there is nothing to reuse yet.
        if self.repo_uri.is_empty() && !self.dest_path.exists() {
            return Err(FetchError::InvalidConfig {
                message: format!(
                    "{} does not exist and no repository URI was given to clone",
                    self.dest_path.display()
                ),
            });
        }
        if self.branch.is_empty() {
            return Err(FetchError::InvalidConfig {
                message: "branch is required".to_string(),
            });
        }
        Ok(())
    }
}

/// Which backend to read from.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    Github(GithubConfig),
    Local(LocalConfig),
}

impl SourceConfig {
    pub fn validate(&self) -> Result<()> {
        match self {
            SourceConfig::Github(config) => config.validate().map(|_| ()),
            SourceConfig::Local(config) => config.validate(),
        }
    }
}

/// Build the backend described by `config`.
///
/// For a local source, `sync` clones or pulls the working copy before
/// returning. Pass `false` to use the working copy exactly as it is on disk.
pub async fn open_source(config: &SourceConfig, sync: bool) -> Result<Box<dyn DeviceTypeSource>> {
    config.validate()?;

    let source: Box<dyn DeviceTypeSource> = match config {
        SourceConfig::Github(config) => Box::new(GithubSource::new(config.clone())?),
        SourceConfig::Local(config) => {
            let source = LocalGitSource::new(config.clone());
            if sync {
                source.sync().await?;
            }
            Box::new(source)
        }
    };

    match config {
        SourceConfig::Github(config) => info!(
            source = source.source_name(),
            owner = %config.owner,
            repo = %config.repo,
            branch = %config.branch,
            "Opened device-type source"
        ),
        SourceConfig::Local(config) => info!(
            source = source.source_name(),
            dest = %config.dest_path.display(),
            branch = %config.branch,
            synced = sync,
            "Opened device-type source"
        ),
    }
    Ok(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_github_defaults() {
        let config = GithubConfig::default();
        assert_eq!(config.url, "https://api.github.com/graphql");
        assert_eq!(config.owner, "netbox-community");
        assert_eq!(config.repo, "devicetype-library");
        assert_eq!(config.branch, "master");
        assert_eq!(config.path, "device-types");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_debug_hides_token() {
        let config = GithubConfig::default().with_token("ghp_secret");
        let printed = format!("{:?}", config);
        assert!(!printed.contains("ghp_secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_github_validate() {
        assert!(GithubConfig::default().validate().is_ok());

        let err = GithubConfig::default().with_url("not a url").validate().unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig { .. }));

        let err = GithubConfig::default()
            .with_repository("", "repo")
            .validate()
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidConfig { .. }));
    }

    #[test]
    fn test_local_validate() {
        let dir = tempfile::tempdir().unwrap();

        // Existing destination can be reused without a URI.
        let config = LocalConfig::new("", dir.path());
        assert!(config.validate().is_ok());

        let config = LocalConfig::new("", dir.path().join("missing"));
        assert!(config.validate().is_err());

        let config = LocalConfig::new("https://example.com/repo.git", dir.path().join("missing"));
        assert!(config.validate().is_ok());
    }

    #[tokio::test]
    async fn test_open_local_source_without_sync() {
        let dir = tempfile::tempdir().unwrap();
        let config = SourceConfig::Local(LocalConfig::new("", dir.path()));

        let source = open_source(&config, false).await.unwrap();
        assert_eq!(source.source_name(), "local");
        assert!(source.enumerate_tree().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_github_source() {
        let config = SourceConfig::Github(GithubConfig::default().with_token("t"));
        let source = open_source(&config, true).await.unwrap();
        assert_eq!(source.source_name(), "github");
    }
}
