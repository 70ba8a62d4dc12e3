//! Change domain model
//!
//! Represents a synthetic change as it moves from a pushed branch,
//! through a pull request, to a merge commit.

use serde::{Deserialize, Serialize};

/// A pull request opened for a generated change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestRef {
    /// GraphQL node id, used by mutations
    pub id: String,

    /// Pull request number, used by queries
    pub number: u64,
}

/// Handle to a change that has been pushed and proposed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeHandle {
    /// Branch the change was pushed to
    pub branch: String,

    /// Pull request proposing the branch
    pub pull_request: PullRequestRef,
}

/// Outcome of merging a change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeResult {
    /// Commit created on the base branch by the merge
    pub merge_commit_sha: String,
}
