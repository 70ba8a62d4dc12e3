//! Scheduler layer for the runner
//!
//! This layer decides when the simulated team ships and follows each change
//! from pull request to deployment, waiting on GitHub along the way.

pub mod deployer;
pub mod poller;

pub use deployer::DeploymentScheduler;
