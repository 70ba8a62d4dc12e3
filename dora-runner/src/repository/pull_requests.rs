//! Pull requests repository
//!
//! Handles the pull request lifecycle of a generated change:
//! - Opening the pull request for a pushed branch
//! - Reading its status check rollup
//! - Merging it

use async_trait::async_trait;
use dora_client::{GitHubClient, Result};
use dora_core::domain::{MergeResult, PullRequestRef};
use tracing::debug;

/// Repository trait for pull request operations
#[async_trait]
pub trait PullRequestRepository: Send + Sync {
    /// Opens a pull request from `head` into `base`
    async fn open_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef>;

    /// Fetches the raw status check rollup state
    ///
    /// `None` means no check has reported yet.
    ///
    /// # Arguments
    /// * `number` - The pull request number
    async fn status_check_rollup(&self, number: u64) -> Result<Option<String>>;

    /// Merges a pull request
    ///
    /// # Arguments
    /// * `id` - The pull request node id
    async fn merge_pull_request(&self, id: &str) -> Result<MergeResult>;
}

#[async_trait]
impl PullRequestRepository for GitHubClient {
    async fn open_pull_request(
        &self,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef> {
        let repository_id = self.repository_id().await?;
        debug!("Resolved {} to node {}", self.repository(), repository_id);

        self.create_pull_request(&repository_id, base, head, title, body)
            .await
    }

    async fn status_check_rollup(&self, number: u64) -> Result<Option<String>> {
        GitHubClient::status_check_rollup(self, number).await
    }

    async fn merge_pull_request(&self, id: &str) -> Result<MergeResult> {
        GitHubClient::merge_pull_request(self, id).await
    }
}
