//! Deployment domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The most recent deployment recorded for a repository
///
/// Owned by GitHub; the scheduler only ever reads the latest one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentRecord {
    pub created_at: DateTime<Utc>,
}
