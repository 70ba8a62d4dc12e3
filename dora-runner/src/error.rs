//! Runner error types
//!
//! Each failure the orchestration loop can hit has its own variant so the
//! logs tell a configuration problem, a failed query, a failed deployment
//! and a timeout apart.

use dora_client::ClientError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::scheduler::poller::PollError;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to query the last deployment of {repo}")]
    Query {
        repo: String,
        #[source]
        source: ClientError,
    },

    #[error(transparent)]
    Poll(PollError),

    #[error("failed to trigger a change")]
    Change(#[source] BoxError),

    #[error("failed to merge pull request #{number}")]
    Merge {
        number: u64,
        #[source]
        source: BoxError,
    },

    #[error("cancelled")]
    Cancelled,
}

impl From<PollError> for RunnerError {
    fn from(err: PollError) -> Self {
        match err {
            PollError::Cancelled { .. } => RunnerError::Cancelled,
            other => RunnerError::Poll(other),
        }
    }
}
