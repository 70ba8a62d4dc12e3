//! Deployments repository
//!
//! Reads the most recent deployment of the watched repository.

use async_trait::async_trait;
use dora_client::{GitHubClient, Result};
use dora_core::domain::DeploymentRecord;

/// Repository trait for deployment history
#[async_trait]
pub trait DeploymentRepository: Send + Sync {
    /// Fetches the most recent deployment
    ///
    /// Returns `None` when the repository has never been deployed; that is
    /// not an error.
    async fn last_deployment(&self) -> Result<Option<DeploymentRecord>>;
}

#[async_trait]
impl DeploymentRepository for GitHubClient {
    async fn last_deployment(&self) -> Result<Option<DeploymentRecord>> {
        GitHubClient::last_deployment(self).await
    }
}
