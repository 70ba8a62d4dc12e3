//! Deployment-related queries

use chrono::{DateTime, Utc};
use dora_core::domain::DeploymentRecord;
use serde::Deserialize;
use tracing::info;

use crate::error::Result;
use crate::{Connection, GitHubClient, queries};

impl GitHubClient {
    /// Get the most recent deployment of the repository
    ///
    /// # Returns
    /// `None` when the repository has never been deployed
    pub async fn last_deployment(&self) -> Result<Option<DeploymentRecord>> {
        let data: LatestDeploymentsData = self
            .execute(
                "LatestDeployments",
                queries::LATEST_DEPLOYMENTS,
                self.repository_variables(),
            )
            .await?;

        let repository = data.repository.ok_or_else(|| self.repository_not_found())?;

        let latest = repository
            .deployments
            .into_nodes()
            .last()
            .map(|node| DeploymentRecord {
                created_at: node.created_at,
            });

        if latest.is_none() {
            info!("No deployments found for {}", self.repo);
        }

        Ok(latest)
    }
}

#[derive(Debug, Deserialize)]
struct LatestDeploymentsData {
    repository: Option<RepositoryDeployments>,
}

#[derive(Debug, Deserialize)]
struct RepositoryDeployments {
    deployments: Connection<DeploymentNode>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeploymentNode {
    created_at: DateTime<Utc>,
}
