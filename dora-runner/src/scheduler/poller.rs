//! Completion poller
//!
//! Waits for an asynchronous GitHub workflow to reach a terminal state by
//! querying it on a fixed tick, bounded by an overall timeout and an external
//! cancellation token. The same loop serves both waits of a cycle: pull
//! request status checks and the deploy workflow of the merge commit.
//!
//! ```text
//! Pending ──tick──▶ Pending | Success | Failure | Error
//!    └──deadline──▶ Timeout
//! ```

use async_trait::async_trait;
use dora_client::ClientError;
use dora_core::domain::PollOutcome;
use dora_core::domain::status::{classify_named_run, classify_rollup};
use std::sync::Arc;
use thiserror::Error;
use tokio::time::{self, Duration, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::repository::{CommitRepository, PullRequestRepository};

/// Timing of a single wait
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Give up after this long
    pub timeout: Duration,

    /// Query this often; the first query happens one tick after start
    pub tick: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(600),
            tick: Duration::from_secs(10),
        }
    }
}

/// Ways a wait can end without success
#[derive(Debug, Error)]
pub enum PollError {
    #[error("failed to query {subject}")]
    Query {
        subject: String,
        #[source]
        source: ClientError,
    },

    #[error("{subject} reported unknown state {state:?}")]
    UnknownState { subject: String, state: String },

    #[error("timed out after {timeout:?} waiting for {subject}")]
    Timeout { subject: String, timeout: Duration },

    #[error("{subject} finished with state {state:?}")]
    Failure { subject: String, state: String },

    #[error("cancelled while waiting for {subject}")]
    Cancelled { subject: String },
}

/// One status query plus its classification
#[async_trait]
pub trait StatusProbe: Send + Sync {
    /// What is being waited on, for logs and errors
    fn subject(&self) -> String;

    /// Queries the current status once
    async fn probe(&self) -> Result<PollOutcome, ClientError>;
}

/// Polls `probe` until it reports a terminal outcome
///
/// Returns as soon as the outcome is terminal, a query fails, the timeout
/// elapses or `cancel` fires. Query errors are not retried. When the
/// deadline and a tick fall on the same instant the deadline wins, so no
/// query is issued at or after the timeout.
pub async fn poll_until_terminal(
    probe: &dyn StatusProbe,
    settings: PollSettings,
    cancel: &CancellationToken,
) -> Result<(), PollError> {
    let subject = probe.subject();
    info!("Waiting up to {:?} for {}", settings.timeout, subject);

    let start = Instant::now();
    let deadline = time::sleep_until(start + settings.timeout);
    tokio::pin!(deadline);

    let mut ticker = time::interval_at(start + settings.tick, settings.tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut ticks: u32 = 0;

    loop {
        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                warn!("Cancelled while waiting for {}", subject);
                return Err(PollError::Cancelled { subject });
            }
            _ = &mut deadline => {
                warn!("Timed out after {} queries waiting for {}", ticks, subject);
                return Err(PollError::Timeout { subject, timeout: settings.timeout });
            }
            _ = ticker.tick() => {}
        }

        ticks += 1;

        let result = tokio::select! {
            biased;

            _ = cancel.cancelled() => return Err(PollError::Cancelled { subject }),
            _ = &mut deadline => {
                return Err(PollError::Timeout { subject, timeout: settings.timeout });
            }
            result = probe.probe() => result,
        };

        let outcome = result.map_err(|source| PollError::Query {
            subject: subject.clone(),
            source,
        })?;

        debug!("{} is {} (query {})", subject, outcome, ticks);

        match outcome {
            PollOutcome::Pending => continue,
            PollOutcome::Success => {
                info!(
                    "{} succeeded after {:?}",
                    subject,
                    Instant::now().duration_since(start)
                );
                return Ok(());
            }
            PollOutcome::Failure(state) => return Err(PollError::Failure { subject, state }),
            PollOutcome::Unknown(state) => return Err(PollError::UnknownState { subject, state }),
        }
    }
}

/// Status check rollup of a pull request
pub struct PullRequestChecksProbe {
    pull_requests: Arc<dyn PullRequestRepository>,
    number: u64,
}

impl PullRequestChecksProbe {
    pub fn new(pull_requests: Arc<dyn PullRequestRepository>, number: u64) -> Self {
        Self {
            pull_requests,
            number,
        }
    }
}

#[async_trait]
impl StatusProbe for PullRequestChecksProbe {
    fn subject(&self) -> String {
        format!("status checks of PR #{}", self.number)
    }

    /// A pull request without a rollup has no reported checks yet
    async fn probe(&self) -> Result<PollOutcome, ClientError> {
        let state = self.pull_requests.status_check_rollup(self.number).await?;
        Ok(state
            .as_deref()
            .map(classify_rollup)
            .unwrap_or(PollOutcome::Pending))
    }
}

/// Deploy workflow run of a commit
pub struct DeploymentWorkflowProbe {
    commits: Arc<dyn CommitRepository>,
    sha: String,
    check_name: String,
}

impl DeploymentWorkflowProbe {
    pub fn new(commits: Arc<dyn CommitRepository>, sha: String, check_name: String) -> Self {
        Self {
            commits,
            sha,
            check_name,
        }
    }
}

#[async_trait]
impl StatusProbe for DeploymentWorkflowProbe {
    fn subject(&self) -> String {
        format!("{} workflow of {}", self.check_name, self.sha)
    }

    async fn probe(&self) -> Result<PollOutcome, ClientError> {
        let runs = self.commits.check_runs(&self.sha).await?;
        Ok(classify_named_run(&runs, &self.check_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dora_core::domain::CheckRun;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Replays scripted outcomes, repeating the last one forever
    struct ScriptedProbe {
        script: Mutex<VecDeque<Result<PollOutcome, ClientError>>>,
        last: PollOutcome,
        calls: AtomicUsize,
    }

    impl ScriptedProbe {
        fn new(script: Vec<Result<PollOutcome, ClientError>>, last: PollOutcome) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last,
                calls: AtomicUsize::new(0),
            }
        }

        fn always(outcome: PollOutcome) -> Self {
            Self::new(Vec::new(), outcome)
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl StatusProbe for ScriptedProbe {
        fn subject(&self) -> String {
            "scripted".to_string()
        }

        async fn probe(&self) -> Result<PollOutcome, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(self.last.clone()))
        }
    }

    fn settings(timeout_secs: u64) -> PollSettings {
        PollSettings {
            timeout: Duration::from_secs(timeout_secs),
            tick: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = PollSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(600));
        assert_eq!(settings.tick, Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_fourth_tick() {
        let probe = ScriptedProbe::new(
            vec![
                Ok(PollOutcome::Pending),
                Ok(PollOutcome::Pending),
                Ok(PollOutcome::Pending),
            ],
            PollOutcome::Success,
        );
        let start = Instant::now();

        poll_until_terminal(&probe, settings(600), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(probe.calls(), 4);
        assert_eq!(start.elapsed(), Duration::from_secs(40));
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_stops_polling() {
        let probe = ScriptedProbe::always(PollOutcome::Pending);
        let start = Instant::now();

        let err = poll_until_terminal(&probe, settings(35), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Timeout { .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(35));
        assert_eq!(probe.calls(), 3);

        time::sleep(Duration::from_secs(60)).await;
        assert_eq!(probe.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_wins_tie_with_tick() {
        let probe = ScriptedProbe::always(PollOutcome::Pending);

        let err = poll_until_terminal(&probe, settings(30), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Timeout { .. }));
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_state_fails_fast() {
        let probe = ScriptedProbe::always(PollOutcome::Unknown("STALE".to_string()));
        let start = Instant::now();

        let err = poll_until_terminal(&probe, settings(600), &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            PollError::UnknownState { state, .. } => assert_eq!(state, "STALE"),
            other => panic!("unexpected error: {:?}", other),
        }
        assert_eq!(probe.calls(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_terminal() {
        let probe = ScriptedProbe::new(
            vec![Ok(PollOutcome::Pending)],
            PollOutcome::Failure("FAILURE".to_string()),
        );

        let err = poll_until_terminal(&probe, settings(600), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Failure { ref state, .. } if state == "FAILURE"));
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_error_is_not_retried() {
        let probe = ScriptedProbe::new(
            vec![
                Ok(PollOutcome::Pending),
                Err(ClientError::api_error(502, "bad gateway")),
            ],
            PollOutcome::Success,
        );

        let err = poll_until_terminal(&probe, settings(600), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Query { .. }));
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_wait() {
        let probe = ScriptedProbe::always(PollOutcome::Pending);
        let cancel = CancellationToken::new();
        let start = Instant::now();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            time::sleep(Duration::from_secs(25)).await;
            trigger.cancel();
        });

        let err = poll_until_terminal(&probe, settings(600), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { .. }));
        assert_eq!(start.elapsed(), Duration::from_secs(25));
        assert_eq!(probe.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_never_queries() {
        let probe = ScriptedProbe::always(PollOutcome::Success);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = poll_until_terminal(&probe, settings(600), &cancel)
            .await
            .unwrap_err();

        assert!(matches!(err, PollError::Cancelled { .. }));
        assert_eq!(probe.calls(), 0);
    }

    struct FixedRepository {
        rollup: Option<String>,
        runs: Vec<CheckRun>,
    }

    #[async_trait]
    impl PullRequestRepository for FixedRepository {
        async fn open_pull_request(
            &self,
            _base: &str,
            _head: &str,
            _title: &str,
            _body: &str,
        ) -> dora_client::Result<dora_core::domain::PullRequestRef> {
            unimplemented!("not used by probes")
        }

        async fn status_check_rollup(&self, _number: u64) -> dora_client::Result<Option<String>> {
            Ok(self.rollup.clone())
        }

        async fn merge_pull_request(
            &self,
            _id: &str,
        ) -> dora_client::Result<dora_core::domain::MergeResult> {
            unimplemented!("not used by probes")
        }
    }

    #[async_trait]
    impl CommitRepository for FixedRepository {
        async fn check_runs(&self, _sha: &str) -> dora_client::Result<Vec<CheckRun>> {
            Ok(self.runs.clone())
        }
    }

    #[tokio::test]
    async fn test_pull_request_probe_classifies_rollup() {
        let pending = PullRequestChecksProbe::new(
            Arc::new(FixedRepository {
                rollup: None,
                runs: Vec::new(),
            }),
            7,
        );
        assert_eq!(pending.probe().await.unwrap(), PollOutcome::Pending);
        assert_eq!(pending.subject(), "status checks of PR #7");

        let errored = PullRequestChecksProbe::new(
            Arc::new(FixedRepository {
                rollup: Some("ERROR".to_string()),
                runs: Vec::new(),
            }),
            7,
        );
        assert_eq!(
            errored.probe().await.unwrap(),
            PollOutcome::Failure("ERROR".to_string())
        );
    }

    #[tokio::test]
    async fn test_deployment_probe_filters_by_name() {
        let probe = DeploymentWorkflowProbe::new(
            Arc::new(FixedRepository {
                rollup: None,
                runs: vec![
                    CheckRun {
                        name: "test".to_string(),
                        status: "COMPLETED".to_string(),
                        conclusion: Some("FAILURE".to_string()),
                    },
                    CheckRun {
                        name: "deploy".to_string(),
                        status: "COMPLETED".to_string(),
                        conclusion: Some("SUCCESS".to_string()),
                    },
                ],
            }),
            "abc123".to_string(),
            "deploy".to_string(),
        );

        assert_eq!(probe.probe().await.unwrap(), PollOutcome::Success);
    }
}
