//! Merge-readiness resolution engine
//!
//! GitHub computes a PR's `mergeable_state` asynchronously after the PR
//! is created or updated, so a single read right after creation almost
//! always says `unknown`. This module turns that eventually-consistent
//! verdict into a definitive decision: poll on a bounded linear backoff
//! schedule, classify each observation, and escalate to check/status
//! aggregation when the verdict is `unstable`.
//!
//! A session is a finite-state loop: at most [`MAX_ATTEMPTS`] sequential
//! queries, each either terminating the session, escalating, or
//! scheduling the next query. Sessions own all their state (attempt
//! counter, timer) and produce exactly one outcome.

pub mod checks;
pub mod schedule;
pub mod source;

pub use checks::EscalationSignal;
pub use schedule::BackoffSchedule;
pub use source::{GitHubMergeState, MergeStateSource, VerdictSnapshot};

use gh_client::MergeableState;
use log::{debug, info, warn};
use std::fmt;

/// Upper bound on verdict queries per session
pub const MAX_ATTEMPTS: u32 = 7;

/// Terminal result of one resolution session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// The PR may be approved and merged
    Clean,
    /// The PR must not be merged
    Rejected(RejectReason),
    /// No terminal verdict within the attempt bound; the caller may
    /// retry a whole new session later
    TimedOut,
}

/// Why a PR was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// GitHub reported merge conflicts (`dirty`)
    Conflicting,
    /// A required validation check failed definitively
    CheckFailure,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Conflicting => write!(f, "merge conflicts"),
            RejectReason::CheckFailure => write!(f, "check failure"),
        }
    }
}

/// Failure to observe merge state at all
///
/// Distinct from [`ResolutionOutcome::Rejected`]: the session couldn't
/// see the verdict, as opposed to seeing a negative one. Not retried
/// inside the engine.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to query merge state: {0}")]
    Fetch(#[source] anyhow::Error),
}

/// Per-attempt decision derived from a verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Classification {
    /// Verdict is authoritative: ready to merge
    Ready,
    /// Verdict is authoritative: conflicting
    Conflicting,
    /// Verdict is ambiguous; inspect validation signals
    Escalate,
    /// Verdict not yet computed; poll again
    Pending,
}

/// Map a raw verdict onto this attempt's decision.
///
/// Only `clean` and `dirty` are immediately authoritative. Everything
/// else (`behind`, `blocked`, `unknown`, future provider values) is
/// provisional: intermediate states are expected while GitHub's verdict
/// computation catches up, not errors.
fn classify(verdict: MergeableState) -> Classification {
    match verdict {
        MergeableState::Clean => Classification::Ready,
        MergeableState::Dirty => Classification::Conflicting,
        MergeableState::Unstable => Classification::Escalate,
        _ => Classification::Pending,
    }
}

/// One merge-readiness resolution session
///
/// Attempts are strictly sequential: each classification decides whether
/// a next attempt happens at all. Multiple sessions for different PRs
/// can run concurrently; nothing here is shared.
pub struct MergeReadinessSession<S> {
    source: S,
    schedule: BackoffSchedule,
    skip_checks: Vec<String>,
}

impl<S: MergeStateSource> MergeReadinessSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            schedule: BackoffSchedule::default(),
            skip_checks: Vec::new(),
        }
    }

    /// Override the backoff schedule (tests use [`BackoffSchedule::immediate`])
    pub fn with_schedule(mut self, schedule: BackoffSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Check names to exclude from escalation aggregation, typically the
    /// landing workflow itself
    pub fn with_skip_checks(mut self, skip_checks: Vec<String>) -> Self {
        self.skip_checks = skip_checks;
        self
    }

    /// Drive the session to its single terminal outcome.
    ///
    /// Attempt 1 fires immediately; each later attempt is preceded by
    /// `delay(previous attempt)`. The sleep suspends only this session.
    pub async fn resolve(&self, pr_number: u64) -> Result<ResolutionOutcome, ResolveError> {
        for attempt in 1..=MAX_ATTEMPTS {
            let snapshot = self
                .source
                .query_verdict(pr_number)
                .await
                .map_err(ResolveError::Fetch)?;

            debug!(
                "PR #{} attempt {}/{}: mergeable_state {:?} @ {}",
                pr_number, attempt, MAX_ATTEMPTS, snapshot.verdict, snapshot.head_sha
            );

            match classify(snapshot.verdict) {
                Classification::Ready => {
                    info!("PR #{} is clean after {} attempt(s)", pr_number, attempt);
                    return Ok(ResolutionOutcome::Clean);
                }
                Classification::Conflicting => {
                    info!("PR #{} has merge conflicts", pr_number);
                    return Ok(ResolutionOutcome::Rejected(RejectReason::Conflicting));
                }
                Classification::Escalate => match self.escalate(&snapshot.head_sha).await {
                    EscalationSignal::Resolve => {
                        info!(
                            "PR #{} unstable, but all blocking checks are ours or green",
                            pr_number
                        );
                        return Ok(ResolutionOutcome::Clean);
                    }
                    EscalationSignal::Reject => {
                        info!("PR #{} rejected: a required check failed", pr_number);
                        return Ok(ResolutionOutcome::Rejected(RejectReason::CheckFailure));
                    }
                    EscalationSignal::Indeterminate => {
                        debug!("PR #{} checks still pending", pr_number);
                    }
                },
                Classification::Pending => {}
            }

            if attempt < MAX_ATTEMPTS {
                let delay = self.schedule.delay(attempt);
                debug!("PR #{}: next verdict query in {:?}", pr_number, delay);
                tokio::time::sleep(delay).await;
            }
        }

        info!(
            "PR #{}: no terminal verdict within {} attempts",
            pr_number, MAX_ATTEMPTS
        );
        Ok(ResolutionOutcome::TimedOut)
    }

    /// Single round of validation-signal aggregation; any further
    /// waiting is delegated back to the polling schedule.
    ///
    /// A fetch failure here is treated as indeterminate rather than
    /// aborting the session: the attempt bound still caps total work.
    async fn escalate(&self, head_sha: &str) -> EscalationSignal {
        match self.source.query_validation_signals(head_sha).await {
            Ok(signals) => checks::aggregate(&signals, &self.skip_checks),
            Err(err) => {
                warn!(
                    "failed to fetch validation signals for {}: {:#}",
                    head_sha, err
                );
                EscalationSignal::Indeterminate
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::checks::{SignalState, ValidationSignal};
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted merge-state source that records call counts
    struct FakeSource {
        verdicts: Mutex<VecDeque<anyhow::Result<VerdictSnapshot>>>,
        signals: Mutex<VecDeque<anyhow::Result<Vec<ValidationSignal>>>>,
        verdict_queries: Mutex<u32>,
        escalations: Mutex<Vec<String>>,
    }

    impl FakeSource {
        fn new(verdicts: Vec<anyhow::Result<VerdictSnapshot>>) -> Self {
            Self {
                verdicts: Mutex::new(verdicts.into_iter().collect()),
                signals: Mutex::new(VecDeque::new()),
                verdict_queries: Mutex::new(0),
                escalations: Mutex::new(Vec::new()),
            }
        }

        fn with_signals(self, signals: Vec<anyhow::Result<Vec<ValidationSignal>>>) -> Self {
            *self.signals.lock().unwrap() = signals.into_iter().collect();
            self
        }

        fn verdict_queries(&self) -> u32 {
            *self.verdict_queries.lock().unwrap()
        }

        fn escalations(&self) -> Vec<String> {
            self.escalations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MergeStateSource for &FakeSource {
        async fn query_verdict(&self, _pr_number: u64) -> anyhow::Result<VerdictSnapshot> {
            *self.verdict_queries.lock().unwrap() += 1;
            self.verdicts
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra verdict query")
        }

        async fn query_validation_signals(
            &self,
            head_sha: &str,
        ) -> anyhow::Result<Vec<ValidationSignal>> {
            self.escalations.lock().unwrap().push(head_sha.to_string());
            self.signals
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected extra escalation")
        }
    }

    fn snapshot(verdict: MergeableState) -> anyhow::Result<VerdictSnapshot> {
        snapshot_at(verdict, "abc123")
    }

    fn snapshot_at(verdict: MergeableState, sha: &str) -> anyhow::Result<VerdictSnapshot> {
        Ok(VerdictSnapshot {
            verdict,
            head_sha: sha.to_string(),
        })
    }

    fn session(source: &FakeSource) -> MergeReadinessSession<&FakeSource> {
        MergeReadinessSession::new(source).with_schedule(BackoffSchedule::immediate())
    }

    #[tokio::test]
    async fn test_clean_terminates_immediately() {
        let source = FakeSource::new(vec![snapshot(MergeableState::Clean)]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::Clean);
        assert_eq!(source.verdict_queries(), 1);
        assert!(source.escalations().is_empty());
    }

    #[tokio::test]
    async fn test_dirty_rejects_immediately() {
        let source = FakeSource::new(vec![snapshot(MergeableState::Dirty)]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(
            outcome,
            ResolutionOutcome::Rejected(RejectReason::Conflicting)
        );
        assert_eq!(source.verdict_queries(), 1);
        assert!(source.escalations().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_then_clean() {
        let source = FakeSource::new(vec![
            snapshot(MergeableState::Unknown),
            snapshot(MergeableState::Unknown),
            snapshot(MergeableState::Clean),
        ]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::Clean);
        assert_eq!(source.verdict_queries(), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_after_exactly_seven_queries() {
        let source = FakeSource::new(
            (0..MAX_ATTEMPTS)
                .map(|_| snapshot(MergeableState::Unknown))
                .collect(),
        );

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::TimedOut);
        assert_eq!(source.verdict_queries(), MAX_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_behind_and_blocked_are_not_escalated() {
        let source = FakeSource::new(vec![
            snapshot(MergeableState::Behind),
            snapshot(MergeableState::Blocked),
            snapshot(MergeableState::Clean),
        ]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::Clean);
        assert!(source.escalations().is_empty());
    }

    #[tokio::test]
    async fn test_unstable_escalates_with_snapshot_sha() {
        let source = FakeSource::new(vec![snapshot_at(MergeableState::Unstable, "feed99")])
            .with_signals(vec![Ok(vec![ValidationSignal::new(
                "ci",
                SignalState::Success,
            )])]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::Clean);
        assert_eq!(source.escalations(), vec!["feed99".to_string()]);
    }

    #[tokio::test]
    async fn test_escalation_reject_becomes_check_failure() {
        let source = FakeSource::new(vec![snapshot(MergeableState::Unstable)]).with_signals(vec![
            Ok(vec![ValidationSignal::new("ci", SignalState::Failure)]),
        ]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(
            outcome,
            ResolutionOutcome::Rejected(RejectReason::CheckFailure)
        );
        assert_eq!(source.verdict_queries(), 1);
    }

    #[tokio::test]
    async fn test_indeterminate_escalation_keeps_polling() {
        let source = FakeSource::new(vec![
            snapshot(MergeableState::Unstable),
            snapshot(MergeableState::Clean),
        ])
        .with_signals(vec![Ok(vec![ValidationSignal::new(
            "ci",
            SignalState::Pending,
        )])]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::Clean);
        assert_eq!(source.verdict_queries(), 2);
        assert_eq!(source.escalations().len(), 1);
    }

    #[tokio::test]
    async fn test_unstable_every_attempt_times_out_with_seven_escalations() {
        let pending = || Ok(vec![ValidationSignal::new("ci", SignalState::Pending)]);
        let source = FakeSource::new(
            (0..MAX_ATTEMPTS)
                .map(|_| snapshot(MergeableState::Unstable))
                .collect(),
        )
        .with_signals((0..MAX_ATTEMPTS).map(|_| pending()).collect());

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::TimedOut);
        assert_eq!(source.verdict_queries(), MAX_ATTEMPTS);
        assert_eq!(source.escalations().len(), MAX_ATTEMPTS as usize);
    }

    #[tokio::test]
    async fn test_fetch_error_aborts_session() {
        let source = FakeSource::new(vec![
            snapshot(MergeableState::Unknown),
            snapshot(MergeableState::Unknown),
            Err(anyhow::anyhow!("503 from api.github.com")),
        ]);

        let result = session(&source).resolve(1).await;

        assert!(matches!(result, Err(ResolveError::Fetch(_))));
        assert_eq!(source.verdict_queries(), 3);
    }

    #[tokio::test]
    async fn test_escalation_fetch_error_continues_polling() {
        let source = FakeSource::new(vec![
            snapshot(MergeableState::Unstable),
            snapshot(MergeableState::Clean),
        ])
        .with_signals(vec![Err(anyhow::anyhow!("502 from api.github.com"))]);

        let outcome = session(&source).resolve(1).await.unwrap();

        assert_eq!(outcome, ResolutionOutcome::Clean);
        assert_eq!(source.verdict_queries(), 2);
    }

    #[tokio::test]
    async fn test_skip_checks_reach_aggregation() {
        let source = FakeSource::new(vec![snapshot(MergeableState::Unstable)]).with_signals(vec![
            Ok(vec![
                ValidationSignal::new("build", SignalState::Success),
                ValidationSignal::new("auto-land", SignalState::Pending),
            ]),
        ]);

        let outcome = session(&source)
            .with_skip_checks(vec!["auto-land".to_string()])
            .resolve(1)
            .await
            .unwrap();

        assert_eq!(outcome, ResolutionOutcome::Clean);
    }

    #[test]
    fn test_classify_authoritative_verdicts_only() {
        assert_eq!(classify(MergeableState::Clean), Classification::Ready);
        assert_eq!(classify(MergeableState::Dirty), Classification::Conflicting);
        assert_eq!(classify(MergeableState::Unstable), Classification::Escalate);
        assert_eq!(classify(MergeableState::Behind), Classification::Pending);
        assert_eq!(classify(MergeableState::Blocked), Classification::Pending);
        assert_eq!(classify(MergeableState::Unknown), Classification::Pending);
    }
}
