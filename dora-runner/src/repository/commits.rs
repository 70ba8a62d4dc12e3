//! Commits repository
//!
//! Reads the workflow check runs attached to a commit.

use async_trait::async_trait;
use dora_client::{GitHubClient, Result};
use dora_core::domain::CheckRun;

/// Repository trait for commit-level status
#[async_trait]
pub trait CommitRepository: Send + Sync {
    /// Fetches the check runs reported for a commit
    ///
    /// # Arguments
    /// * `sha` - The commit to inspect
    async fn check_runs(&self, sha: &str) -> Result<Vec<CheckRun>>;
}

#[async_trait]
impl CommitRepository for GitHubClient {
    async fn check_runs(&self, sha: &str) -> Result<Vec<CheckRun>> {
        self.commit_check_runs(sha).await
    }
}
