//! Status classification
//!
//! GitHub reports progress as coarse status strings. These helpers turn
//! them into a [`PollOutcome`], which is all the completion poller needs to
//! decide whether to keep waiting.
//!
//! Unrecognised strings classify as [`PollOutcome::Unknown`] rather than
//! pending, so a status nobody understands ends the wait instead of
//! stretching it to the timeout.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of a single poll tick
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PollOutcome {
    /// Still running
    Pending,

    /// Finished successfully
    Success,

    /// Finished unsuccessfully, with the observed state
    Failure(String),

    /// The observed state is not one we know how to interpret
    Unknown(String),
}

impl PollOutcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollOutcome::Pending)
    }
}

impl fmt::Display for PollOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PollOutcome::Pending => write!(f, "pending"),
            PollOutcome::Success => write!(f, "success"),
            PollOutcome::Failure(state) => write!(f, "failure ({})", state),
            PollOutcome::Unknown(state) => write!(f, "unknown ({})", state),
        }
    }
}

/// A check run attached to a commit, as reported by its status rollup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    pub name: String,
    pub status: String,
    pub conclusion: Option<String>,
}

/// Classifies a pull request status check rollup state
pub fn classify_rollup(state: &str) -> PollOutcome {
    match state {
        "SUCCESS" => PollOutcome::Success,
        "FAILURE" | "ERROR" => PollOutcome::Failure(state.to_string()),
        "PENDING" | "EXPECTED" => PollOutcome::Pending,
        other => PollOutcome::Unknown(other.to_string()),
    }
}

/// Classifies a workflow check run from its status and conclusion
pub fn classify_check_run(status: &str, conclusion: Option<&str>) -> PollOutcome {
    match status {
        "COMPLETED" => match conclusion {
            Some("SUCCESS") => PollOutcome::Success,
            Some(other) => PollOutcome::Failure(other.to_string()),
            None => PollOutcome::Failure(status.to_string()),
        },
        "IN_PROGRESS" | "QUEUED" | "REQUESTED" | "WAITING" | "PENDING" => PollOutcome::Pending,
        other => PollOutcome::Unknown(other.to_string()),
    }
}

/// Classifies the runs named `name` among a commit's check runs
///
/// The first run with a terminal classification decides the outcome. A
/// commit with no matching run yet is still pending: the workflow may not
/// have been scheduled.
pub fn classify_named_run(runs: &[CheckRun], name: &str) -> PollOutcome {
    runs.iter()
        .filter(|run| run.name == name)
        .map(|run| classify_check_run(&run.status, run.conclusion.as_deref()))
        .find(PollOutcome::is_terminal)
        .unwrap_or(PollOutcome::Pending)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(name: &str, status: &str, conclusion: Option<&str>) -> CheckRun {
        CheckRun {
            name: name.to_string(),
            status: status.to_string(),
            conclusion: conclusion.map(str::to_string),
        }
    }

    #[test]
    fn test_classify_rollup() {
        assert_eq!(classify_rollup("SUCCESS"), PollOutcome::Success);
        assert_eq!(classify_rollup("PENDING"), PollOutcome::Pending);
        assert_eq!(classify_rollup("EXPECTED"), PollOutcome::Pending);
        assert_eq!(
            classify_rollup("FAILURE"),
            PollOutcome::Failure("FAILURE".to_string())
        );
        assert_eq!(
            classify_rollup("ERROR"),
            PollOutcome::Failure("ERROR".to_string())
        );
    }

    #[test]
    fn test_classify_rollup_unknown_is_not_pending() {
        let outcome = classify_rollup("STALE");
        assert_eq!(outcome, PollOutcome::Unknown("STALE".to_string()));
        assert!(outcome.is_terminal());
    }

    #[test]
    fn test_classify_check_run() {
        assert_eq!(
            classify_check_run("COMPLETED", Some("SUCCESS")),
            PollOutcome::Success
        );
        assert_eq!(
            classify_check_run("COMPLETED", Some("CANCELLED")),
            PollOutcome::Failure("CANCELLED".to_string())
        );
        assert_eq!(classify_check_run("QUEUED", None), PollOutcome::Pending);
        assert_eq!(classify_check_run("IN_PROGRESS", None), PollOutcome::Pending);
        assert_eq!(classify_check_run("REQUESTED", None), PollOutcome::Pending);
        assert_eq!(
            classify_check_run("ARCHIVED", None),
            PollOutcome::Unknown("ARCHIVED".to_string())
        );
    }

    #[test]
    fn test_classify_named_run_ignores_other_jobs() {
        let runs = vec![
            run("lint", "COMPLETED", Some("FAILURE")),
            run("deploy", "IN_PROGRESS", None),
        ];
        assert_eq!(classify_named_run(&runs, "deploy"), PollOutcome::Pending);

        let runs = vec![
            run("lint", "COMPLETED", Some("FAILURE")),
            run("deploy", "COMPLETED", Some("SUCCESS")),
        ];
        assert_eq!(classify_named_run(&runs, "deploy"), PollOutcome::Success);
    }

    #[test]
    fn test_classify_named_run_missing_is_pending() {
        let runs = vec![run("build", "COMPLETED", Some("SUCCESS"))];
        assert_eq!(classify_named_run(&runs, "deploy"), PollOutcome::Pending);
        assert_eq!(classify_named_run(&[], "deploy"), PollOutcome::Pending);
    }
}
