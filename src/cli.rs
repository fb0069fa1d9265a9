// src/cli.rs
// =============================================================================
// Command-line interface, defined with clap's derive API.
//
// Every subcommand shares the same source options (which backend, and how to
// reach it); the subcommand picks the operation.
// =============================================================================

use anyhow::{anyhow, bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use devicetype_fetch::config::{
    DEFAULT_BRANCH, DEFAULT_GRAPHQL_URL, DEFAULT_OWNER, DEFAULT_PATH, DEFAULT_REPO,
};
use devicetype_fetch::{GithubConfig, LocalConfig, QuerySelection, SourceConfig};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    name = "devicetype-fetch",
    version,
    about = "List and fetch device-type definition files from GitHub or a local git clone",
    long_about = "devicetype-fetch reads a device-type library laid out as <vendor>/<model>.yaml. \
                  `tree` lists every model with its git blob id, `files` prints the contents of \
                  the models you ask for by id."
)]
pub struct Cli {
    /// Log debug output to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List vendors and models with their content hashes
    ///
    /// Example: devicetype-fetch tree --json
    Tree {
        #[command(flatten)]
        source: SourceArgs,

        /// Output JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Print the contents of selected model files
    ///
    /// Example: devicetype-fetch files --select 3b18e51=Cisco/c9300-48p.yaml
    Files {
        #[command(flatten)]
        source: SourceArgs,

        /// File to fetch, as <SHA>=<vendor/model>; repeat for more
        #[arg(long = "select", value_name = "SHA=PATH", value_parser = parse_selection)]
        select: Vec<(String, String)>,

        /// Fetch every model in the tree
        #[arg(long, conflicts_with = "select")]
        all: bool,

        /// Output JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// GitHub GraphQL API
    Github,
    /// Local git clone
    Local,
}

#[derive(Args, Debug)]
pub struct SourceArgs {
    /// Where to read the library from
    #[arg(long, value_enum, default_value_t = Backend::Github)]
    pub backend: Backend,

    /// Branch to read
    #[arg(long, default_value = DEFAULT_BRANCH)]
    pub branch: String,

    /// Folder holding the vendor directories
    #[arg(long, default_value = DEFAULT_PATH)]
    pub path: String,

    /// GraphQL endpoint (github backend)
    #[arg(long, default_value = DEFAULT_GRAPHQL_URL)]
    pub url: String,

    /// API token (github backend)
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Repository owner (github backend)
    #[arg(long, default_value = DEFAULT_OWNER)]
    pub owner: String,

    /// Repository name (github backend)
    #[arg(long, default_value = DEFAULT_REPO)]
    pub repo: String,

    /// Request timeout in seconds; no timeout when omitted (github backend)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// URI to clone from when --dest doesn't exist yet (local backend)
    #[arg(long)]
    pub repo_uri: Option<String>,

    /// Working copy location (local backend)
    #[arg(long)]
    pub dest: Option<PathBuf>,

    /// Use the working copy as-is instead of cloning/pulling (local backend)
    #[arg(long)]
    pub skip_sync: bool,
}

impl SourceArgs {
    /// Turn the flags into a backend configuration.
    pub fn to_config(&self) -> Result<SourceConfig> {
        match self.backend {
            Backend::Github => {
                let token = self
                    .token
                    .clone()
                    .ok_or_else(|| anyhow!("--token or GITHUB_TOKEN is required for the github backend"))?;
                let mut config = GithubConfig::default()
                    .with_url(&self.url)
                    .with_token(token)
                    .with_repository(&self.owner, &self.repo)
                    .with_branch(&self.branch)
                    .with_path(&self.path);
                if let Some(secs) = self.timeout_secs {
                    config = config.with_timeout(Duration::from_secs(secs));
                }
                Ok(SourceConfig::Github(config))
            }
            Backend::Local => {
                let Some(dest) = &self.dest else {
                    bail!("--dest is required for the local backend");
                };
                let uri = self.repo_uri.clone().unwrap_or_default();
                let config = LocalConfig::new(uri, dest)
                    .with_branch(&self.branch)
                    .with_path(&self.path);
                Ok(SourceConfig::Local(config))
            }
        }
    }
}

/// Collect `--select` pairs into a selection map.
pub fn to_selection(pairs: &[(String, String)]) -> QuerySelection {
    pairs.iter().cloned().collect()
}

fn parse_selection(raw: &str) -> Result<(String, String), String> {
    let (sha, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SHA=vendor/model, got '{}'", raw))?;
    if sha.is_empty() || path.is_empty() {
        return Err(format!("expected SHA=vendor/model, got '{}'", raw));
    }
    Ok((sha.to_string(), path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(
            parse_selection("abc123=Acme/widget.yaml").unwrap(),
            ("abc123".to_string(), "Acme/widget.yaml".to_string())
        );
        assert!(parse_selection("abc123").is_err());
        assert!(parse_selection("=Acme/widget.yaml").is_err());
    }

    #[test]
    fn test_files_command_collects_selection() {
        let cli = Cli::parse_from([
            "devicetype-fetch",
            "files",
            "--token",
            "t",
            "--select",
            "aaa=Acme/one.yaml",
            "--select",
            "bbb=Acme/two.yaml",
        ]);
        let Commands::Files { select, all, .. } = cli.command else {
            panic!("expected files command");
        };
        assert!(!all);
        let selection = to_selection(&select);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection["bbb"], "Acme/two.yaml");
    }

    #[test]
    fn test_local_backend_requires_dest() {
        let cli = Cli::parse_from(["devicetype-fetch", "tree", "--backend", "local"]);
        let Commands::Tree { source, .. } = cli.command else {
            panic!("expected tree command");
        };
        assert!(source.to_config().is_err());
    }

    #[test]
    fn test_github_backend_config() {
        let cli = Cli::parse_from([
            "devicetype-fetch",
            "tree",
            "--token",
            "t",
            "--owner",
            "me",
            "--repo",
            "library",
            "--timeout-secs",
            "5",
        ]);
        let Commands::Tree { source, .. } = cli.command else {
            panic!("expected tree command");
        };
        let SourceConfig::Github(config) = source.to_config().unwrap() else {
            panic!("expected github config");
        };
        assert_eq!(config.owner, "me");
        assert_eq!(config.repo, "library");
        assert_eq!(config.branch, "master");
        assert_eq!(config.timeout, Some(Duration::from_secs(5)));
    }
}
