//! Pull request API operations

use dora_core::domain::{MergeResult, PullRequestRef};
use serde::Deserialize;
use serde_json::json;

use crate::error::{ClientError, Result};
use crate::{GitHubClient, queries};

impl GitHubClient {
    // =============================================================================
    // Pull Request Lifecycle
    // =============================================================================

    /// Get the GraphQL node id of the repository
    ///
    /// Mutations address the repository by node id rather than owner/name.
    pub async fn repository_id(&self) -> Result<String> {
        let data: RepositoryIdData = self
            .execute(
                "RepositoryId",
                queries::REPOSITORY_ID,
                self.repository_variables(),
            )
            .await?;

        data.repository
            .map(|repository| repository.id)
            .ok_or_else(|| self.repository_not_found())
    }

    /// Open a pull request
    ///
    /// # Arguments
    /// * `repository_id` - Node id from [`GitHubClient::repository_id`]
    /// * `base` - Branch the change should land on
    /// * `head` - Branch holding the change
    /// * `title` - Pull request title
    /// * `body` - Pull request description
    pub async fn create_pull_request(
        &self,
        repository_id: &str,
        base: &str,
        head: &str,
        title: &str,
        body: &str,
    ) -> Result<PullRequestRef> {
        let data: CreatePullRequestData = self
            .execute(
                "CreatePullRequest",
                queries::CREATE_PULL_REQUEST,
                json!({
                    "repositoryId": repository_id,
                    "baseRefName": base,
                    "headRefName": head,
                    "title": title,
                    "body": body,
                }),
            )
            .await?;

        let pull_request = data
            .create_pull_request
            .and_then(|payload| payload.pull_request)
            .ok_or_else(|| ClientError::ParseError("createPullRequest returned no pull request".into()))?;

        Ok(PullRequestRef {
            id: pull_request.id,
            number: pull_request.number,
        })
    }

    /// Merge a pull request with the repository's default merge method
    ///
    /// # Returns
    /// The sha of the merge commit on the base branch
    pub async fn merge_pull_request(&self, pull_request_id: &str) -> Result<MergeResult> {
        let data: MergePullRequestData = self
            .execute(
                "MergePullRequest",
                queries::MERGE_PULL_REQUEST,
                json!({ "pullRequestId": pull_request_id }),
            )
            .await?;

        let oid = data
            .merge_pull_request
            .and_then(|payload| payload.pull_request)
            .and_then(|pull_request| pull_request.merge_commit)
            .map(|commit| commit.oid)
            .ok_or_else(|| ClientError::ParseError("merged pull request has no merge commit".into()))?;

        Ok(MergeResult {
            merge_commit_sha: oid,
        })
    }

    // =============================================================================
    // Status Checks
    // =============================================================================

    /// Get the state of a pull request's status check rollup
    ///
    /// # Returns
    /// The raw rollup state (e.g. `SUCCESS`, `PENDING`), or `None` when no
    /// check has reported yet
    pub async fn status_check_rollup(&self, number: u64) -> Result<Option<String>> {
        let mut variables = self.repository_variables();
        variables["number"] = json!(number);

        let data: StatusCheckRollupData = self
            .execute(
                "PullRequestStatusCheckRollup",
                queries::PULL_REQUEST_STATUS_CHECK_ROLLUP,
                variables,
            )
            .await?;

        let pull_request = data
            .repository
            .ok_or_else(|| self.repository_not_found())?
            .pull_request
            .ok_or_else(|| ClientError::NotFound(format!("pull request #{}", number)))?;

        Ok(pull_request.status_check_rollup.map(|rollup| rollup.state))
    }
}

#[derive(Debug, Deserialize)]
struct RepositoryIdData {
    repository: Option<RepositoryId>,
}

#[derive(Debug, Deserialize)]
struct RepositoryId {
    id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatePullRequestData {
    create_pull_request: Option<PullRequestPayload<CreatedPullRequest>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergePullRequestData {
    merge_pull_request: Option<PullRequestPayload<MergedPullRequest>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestPayload<T> {
    pull_request: Option<T>,
}

#[derive(Debug, Deserialize)]
struct CreatedPullRequest {
    id: String,
    number: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MergedPullRequest {
    merge_commit: Option<CommitOid>,
}

#[derive(Debug, Deserialize)]
struct CommitOid {
    oid: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusCheckRollupData {
    repository: Option<RepositoryPullRequest>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepositoryPullRequest {
    pull_request: Option<PullRequestRollup>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PullRequestRollup {
    status_check_rollup: Option<RollupState>,
}

#[derive(Debug, Deserialize)]
struct RollupState {
    state: String,
}
