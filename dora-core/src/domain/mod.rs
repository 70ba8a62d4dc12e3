//! Core domain types
//!
//! This module contains the domain structures shared between the runner
//! (which drives deployments) and the CLI (which inspects them).

pub mod change;
pub mod deployment;
pub mod status;
pub mod tier;

pub use change::{ChangeHandle, MergeResult, PullRequestRef};
pub use deployment::DeploymentRecord;
pub use status::{CheckRun, PollOutcome};
pub use tier::{DeployInterval, PerformanceTier, TeamLevel};
