//! Repository layer
//!
//! Repositories abstract the GitHub reads and writes the scheduler relies
//! on. They are thin: no business logic, just a focused interface over
//! [`GitHubClient`] per resource.
//!
//! All repositories are trait-based to enable testing and mocking.

mod commits;
mod deployments;
mod pull_requests;

use dora_client::GitHubClient;
use std::sync::Arc;

// Re-export traits
pub use commits::CommitRepository;
pub use deployments::DeploymentRepository;
pub use pull_requests::PullRequestRepository;

/// The set of repositories a deployment cycle needs
#[derive(Clone)]
pub struct Repositories {
    pub deployments: Arc<dyn DeploymentRepository>,
    pub pull_requests: Arc<dyn PullRequestRepository>,
    pub commits: Arc<dyn CommitRepository>,
}

impl Repositories {
    /// Backs every repository with the same GitHub client
    pub fn github(client: Arc<GitHubClient>) -> Self {
        Self {
            deployments: client.clone(),
            pull_requests: client.clone(),
            commits: client,
        }
    }
}
