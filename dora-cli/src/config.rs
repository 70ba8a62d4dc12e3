//! Configuration module
//!
//! Handles CLI configuration: the GitHub endpoint and the repository the
//! simulated team deploys to.

use anyhow::{Context, Result};
use dora_client::{GitHubClient, RepositoryRef};

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// GraphQL endpoint
    pub graphql_url: String,

    /// Personal access token, only needed by commands that talk to GitHub
    pub token: Option<String>,

    /// Organisation owning the repository
    pub org: Option<String>,

    /// Repository name
    pub repo: Option<String>,
}

impl Config {
    /// Builds a GitHub client, failing if any connection setting is missing
    pub fn client(&self) -> Result<GitHubClient> {
        let token = self
            .token
            .clone()
            .context("A token is required (--token or GH_PAT)")?;
        let org = self
            .org
            .clone()
            .context("An organisation is required (--org or GH_ORG)")?;
        let repo = self
            .repo
            .clone()
            .context("A repository is required (--repo or GH_REPO_NAME)")?;

        Ok(GitHubClient::new(
            self.graphql_url.clone(),
            token,
            RepositoryRef::new(org, repo),
        ))
    }
}
