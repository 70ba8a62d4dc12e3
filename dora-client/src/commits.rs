//! Commit-related queries

use dora_core::domain::CheckRun;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::{Connection, GitHubClient, queries};

impl GitHubClient {
    /// List the check runs reported on a commit's status rollup
    ///
    /// Legacy commit statuses in the rollup are ignored; only GitHub Actions
    /// check runs are returned. A commit without a rollup has no runs yet.
    /// Contexts are fetched 100 per page until the rollup is exhausted.
    ///
    /// # Arguments
    /// * `sha` - The commit sha (or any expression GitHub resolves to a commit)
    pub async fn commit_check_runs(&self, sha: &str) -> Result<Vec<CheckRun>> {
        let mut runs = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let mut variables = self.repository_variables();
            variables["sha"] = json!(sha);
            variables["after"] = json!(after);

            let data: CommitCheckRunsData = self
                .execute("CommitCheckRuns", queries::COMMIT_CHECK_RUNS, variables)
                .await?;

            let object = data
                .repository
                .ok_or_else(|| self.repository_not_found())?
                .object;

            let commit = match object {
                Some(GitObject::Commit(commit)) => commit,
                _ => return Err(ClientError::NotFound(format!("commit {}", sha))),
            };

            let Some(rollup) = commit.status_check_rollup else {
                break;
            };

            after = rollup.contexts.next_cursor();
            runs.extend(
                rollup
                    .contexts
                    .into_nodes()
                    .filter_map(|context| match context {
                        RollupContext::CheckRun(run) => Some(CheckRun {
                            name: run.name,
                            status: run.status,
                            conclusion: run.conclusion,
                        }),
                        RollupContext::Other => None,
                    }),
            );

            if after.is_none() {
                break;
            }
            debug!("Fetching next page of check runs for {}", sha);
        }

        Ok(runs)
    }
}

#[derive(Debug, Deserialize)]
struct CommitCheckRunsData {
    repository: Option<RepositoryObject>,
}

#[derive(Debug, Deserialize)]
struct RepositoryObject {
    object: Option<GitObject>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum GitObject {
    Commit(CommitRollup),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommitRollup {
    status_check_rollup: Option<RollupContexts>,
}

#[derive(Debug, Deserialize)]
struct RollupContexts {
    contexts: Connection<RollupContext>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "__typename")]
enum RollupContext {
    CheckRun(CheckRunNode),
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct CheckRunNode {
    name: String,
    status: String,
    conclusion: Option<String>,
}
