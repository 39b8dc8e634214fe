//! Escalation resolver: validation-signal aggregation
//!
//! When GitHub reports a PR as `unstable`, the verdict alone doesn't say
//! whether the blocking checks have definitively failed or are merely
//! still running. This module reduces all validation signals attached to
//! the PR's head revision into a single tri-state answer.

use gh_client::{CheckConclusion, CheckRun, CheckRunStatus, CheckState, CheckStatus};

/// A named pass/fail/pending result attached to a revision, normalized
/// from both the Checks API and the legacy Status API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationSignal {
    /// Check run name or status context
    pub name: String,
    /// Normalized state
    pub state: SignalState,
}

impl ValidationSignal {
    pub fn new(name: impl Into<String>, state: SignalState) -> Self {
        Self {
            name: name.into(),
            state,
        }
    }
}

/// Normalized state of a single validation signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalState {
    /// Still queued or running
    Pending,
    /// Completed without a merge-blocking conclusion
    Success,
    /// Completed with a definitive failure
    Failure,
}

/// Reduced result of inspecting all validation signals for a revision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscalationSignal {
    /// Treat the PR as mergeable
    Resolve,
    /// Treat the PR as a hard failure
    Reject,
    /// Keep polling on the normal schedule
    Indeterminate,
}

/// Aggregate validation signals into one escalation signal.
///
/// Signals whose name appears in `skip` are excluded first; these are
/// checks the landing workflow itself produces, which would otherwise
/// keep the PR `unstable` forever while we wait on them. The rule over
/// the remaining signals is total:
///
/// 1. any failure → `Reject`
/// 2. any pending → `Indeterminate`
/// 3. all success (even if only skipped signals remain) → `Resolve`
/// 4. no signals at all → `Indeterminate` (nothing observed; the verdict
///    may have been computed against state we can't see yet)
pub fn aggregate(signals: &[ValidationSignal], skip: &[String]) -> EscalationSignal {
    if signals.is_empty() {
        return EscalationSignal::Indeterminate;
    }

    let considered: Vec<&ValidationSignal> = signals
        .iter()
        .filter(|s| !skip.iter().any(|name| name == &s.name))
        .collect();

    if considered
        .iter()
        .any(|s| s.state == SignalState::Failure)
    {
        return EscalationSignal::Reject;
    }

    if considered
        .iter()
        .any(|s| s.state == SignalState::Pending)
    {
        return EscalationSignal::Indeterminate;
    }

    EscalationSignal::Resolve
}

/// Normalize a check run (Checks API) into a validation signal
pub fn signal_from_check_run(run: &CheckRun) -> ValidationSignal {
    let state = match run.status {
        CheckRunStatus::Queued | CheckRunStatus::InProgress => SignalState::Pending,
        CheckRunStatus::Completed => match run.conclusion {
            Some(
                CheckConclusion::Failure
                | CheckConclusion::TimedOut
                | CheckConclusion::Cancelled
                | CheckConclusion::ActionRequired,
            ) => SignalState::Failure,
            // Neutral, skipped and stale conclusions don't block a merge
            Some(_) => SignalState::Success,
            None => SignalState::Pending,
        },
    };

    ValidationSignal::new(run.name.clone(), state)
}

/// Normalize combined commit status (Status API) into validation signals
pub fn signals_from_commit_status(status: &CheckStatus) -> Vec<ValidationSignal> {
    status
        .statuses
        .iter()
        .map(|s| {
            let state = match s.state {
                CheckState::Success => SignalState::Success,
                CheckState::Failure | CheckState::Error => SignalState::Failure,
                CheckState::Pending => SignalState::Pending,
            };
            ValidationSignal::new(s.context.clone(), state)
        })
        .collect()
}
