//! Change service
//!
//! Produces the synthetic change each deployment cycle ships:
//! - Clones the repository into a temporary directory
//! - Flips the pinned version of the demo Terraform module
//! - Commits and pushes the edit on a fresh branch
//! - Opens a pull request, and later merges it

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use dora_core::domain::{ChangeHandle, MergeResult};
use regex::Regex;
use reqwest::Url;
use std::sync::{Arc, LazyLock};
use tracing::info;

use crate::config::Config;
use crate::repository::PullRequestRepository;
use crate::service::git::GitWorkspace;

/// Module whose `?ref=` pin is toggled by every change
pub const MODULE_SOURCE: &str = "github.com/liatrio/dora-lambda-tf-module-demo";

/// Version a change upgrades to
pub const CURRENT_VERSION: &str = "v0.6.2";

/// Version a change downgrades to when already current
pub const PREVIOUS_VERSION: &str = "v0.3.0";

const CLONE_USERNAME: &str = "dora-the-explorer";
const BRANCH_PREFIX: &str = "dora-the-explorer-";
const COMMIT_MESSAGE: &str = "Updated version in terragrunt.hcl";
const AUTHOR_NAME: &str = "Bill Murray";
const AUTHOR_EMAIL: &str = "ghostbuster-bill@hookandladder8.com";
const PULL_REQUEST_TITLE: &str = "fix: Change app version";
const PULL_REQUEST_BODY: &str = "Generated by Dora the Explorer";

static MODULE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"({}\?ref=)v\d+\.\d+\.\d+", regex::escape(MODULE_SOURCE)))
        .expect("module ref pattern is valid")
});

static CURRENT_MODULE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"{}\?ref={}",
        regex::escape(MODULE_SOURCE),
        regex::escape(CURRENT_VERSION)
    ))
    .expect("current module ref pattern is valid")
});

/// Service trait for producing and landing changes
#[async_trait]
pub trait ChangeService: Send + Sync {
    /// Pushes a new change and opens a pull request for it
    async fn trigger_change(&self) -> Result<ChangeHandle>;

    /// Merges the pull request of a triggered change
    async fn merge_change(&self, change: &ChangeHandle) -> Result<MergeResult>;
}

/// Returns true when `content` pins the module at [`CURRENT_VERSION`]
pub fn needs_downgrade(content: &str) -> bool {
    CURRENT_MODULE_REF.is_match(content)
}

/// Flips every module pin between [`CURRENT_VERSION`] and [`PREVIOUS_VERSION`]
///
/// # Returns
/// The rewritten content and the version it now pins, or `None` when the
/// content does not reference the module at all
pub fn toggle_module_version(content: &str) -> Option<(String, &'static str)> {
    if !MODULE_REF.is_match(content) {
        return None;
    }

    let target = if needs_downgrade(content) {
        PREVIOUS_VERSION
    } else {
        CURRENT_VERSION
    };

    let replacement = format!("${{1}}{}", target);
    let updated = MODULE_REF.replace_all(content, replacement.as_str());
    Some((updated.into_owned(), target))
}

/// Change service backed by a git clone and the GitHub API
pub struct GitChangeService {
    remote_url: String,
    token: String,
    change_file_path: String,
    pull_requests: Arc<dyn PullRequestRepository>,
}

impl GitChangeService {
    /// Creates a new git change service
    ///
    /// # Arguments
    /// * `config` - Runner configuration (remote URL, token, change file)
    /// * `pull_requests` - Repository used to open and merge pull requests
    pub fn new(config: &Config, pull_requests: Arc<dyn PullRequestRepository>) -> Self {
        Self {
            remote_url: config.remote_url(),
            token: config.token.clone(),
            change_file_path: config.change_file_path.clone(),
            pull_requests,
        }
    }

    /// Remote URL with basic-auth credentials for git over HTTPS
    fn authenticated_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.remote_url)
            .with_context(|| format!("Invalid repository URL: {}", self.remote_url))?;

        url.set_username(CLONE_USERNAME)
            .and_then(|_| url.set_password(Some(&self.token)))
            .map_err(|_| anyhow::anyhow!("Cannot embed credentials in {}", self.remote_url))?;

        Ok(url.to_string())
    }
}

#[async_trait]
impl ChangeService for GitChangeService {
    async fn trigger_change(&self) -> Result<ChangeHandle> {
        let tempdir = tempfile::Builder::new()
            .prefix("cloned-repo")
            .tempdir()
            .context("Failed to create temp dir")?;
        info!("Cloning {} into {}", self.remote_url, tempdir.path().display());

        let workspace =
            GitWorkspace::clone(&self.authenticated_url()?, tempdir.path(), &self.token).await?;
        let base = workspace.current_branch().await?;

        let branch = format!("{}{}", BRANCH_PREFIX, Utc::now().timestamp_millis());
        workspace.checkout_new_branch(&branch).await?;

        let file = workspace.path().join(&self.change_file_path);
        let content = tokio::fs::read_to_string(&file)
            .await
            .with_context(|| format!("Failed to read {}", self.change_file_path))?;

        let (updated, version) = toggle_module_version(&content).with_context(|| {
            format!(
                "{} does not reference {}",
                self.change_file_path, MODULE_SOURCE
            )
        })?;

        tokio::fs::write(&file, updated)
            .await
            .with_context(|| format!("Failed to write {}", self.change_file_path))?;
        info!("Pinned {} to {} on {}", MODULE_SOURCE, version, branch);

        workspace.add(&self.change_file_path).await?;
        workspace
            .commit(COMMIT_MESSAGE, AUTHOR_NAME, AUTHOR_EMAIL)
            .await?;
        workspace.push_branch(&branch).await?;
        info!("Pushed to remote branch: {}", branch);

        let pull_request = self
            .pull_requests
            .open_pull_request(&base, &branch, PULL_REQUEST_TITLE, PULL_REQUEST_BODY)
            .await
            .context("Failed to create pull request")?;
        info!("Created PR #{} ({} -> {})", pull_request.number, branch, base);

        Ok(ChangeHandle {
            branch,
            pull_request,
        })
    }

    async fn merge_change(&self, change: &ChangeHandle) -> Result<MergeResult> {
        let merge = self
            .pull_requests
            .merge_pull_request(&change.pull_request.id)
            .await
            .with_context(|| format!("Failed to merge PR #{}", change.pull_request.number))?;

        info!(
            "Merged PR #{} as {}",
            change.pull_request.number, merge.merge_commit_sha
        );
        Ok(merge)
    }
}
