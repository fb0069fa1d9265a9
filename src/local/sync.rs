// src/local/sync.rs
// =============================================================================
// Clone-or-reuse, then pull: keeps the working copy at `dest_path` current.
//
// "Pull" here is fetch + fast-forward of the checked-out branch from
// `origin`. A working copy that has diverged from origin is reported rather
// than merged.
// =============================================================================

use crate::config::LocalConfig;
use crate::error::{FetchError, Result};
use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::Repository;
use tracing::{debug, info};

pub fn sync_working_copy(config: &LocalConfig) -> Result<()> {
    if !config.dest_path.exists() {
        info!(
            uri = %config.repo_uri,
            dest = %config.dest_path.display(),
            branch = %config.branch,
            "Cloning device-type repository"
        );
        RepoBuilder::new()
            .branch(&config.branch)
            .clone(&config.repo_uri, &config.dest_path)?;
    }

    let repo = Repository::open(&config.dest_path)?;
    pull_origin(&repo)
}

fn pull_origin(repo: &Repository) -> Result<()> {
    let head = repo.head()?;
    if !head.is_branch() {
        return Err(git2::Error::from_str("HEAD is detached, nothing to pull into").into());
    }
    let branch = head
        .shorthand()
        .ok_or_else(|| git2::Error::from_str("branch name is not valid UTF-8"))?
        .to_string();

    let mut remote = repo.find_remote("origin")?;
    remote.fetch(&[branch.as_str()], None, None)?;

    let fetch_head = repo.find_reference("FETCH_HEAD")?;
    let fetched = repo.reference_to_annotated_commit(&fetch_head)?;
    let (analysis, _) = repo.merge_analysis(&[&fetched])?;

    if analysis.is_up_to_date() {
        debug!(branch = %branch, "Working copy already up to date");
        return Ok(());
    }

    if analysis.is_fast_forward() {
        let refname = format!("refs/heads/{}", branch);
        let mut reference = repo.find_reference(&refname)?;
        reference.set_target(fetched.id(), "pull: fast-forward")?;
        repo.set_head(&refname)?;
        repo.checkout_head(Some(CheckoutBuilder::default().force()))?;
        info!(branch = %branch, commit = %fetched.id(), "Fast-forwarded working copy");
        return Ok(());
    }

    Err(FetchError::NotFastForward { branch })
}
