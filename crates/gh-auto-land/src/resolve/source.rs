//! Merge-state query interface
//!
//! The resolution session observes the review system only through the
//! `MergeStateSource` trait, so sessions can be driven by scripted fakes
//! in tests. `GitHubMergeState` is the production implementation on top
//! of `GitHubClient`.

use crate::resolve::checks::{signal_from_check_run, signals_from_commit_status, ValidationSignal};
use async_trait::async_trait;
use gh_client::{GitHubClient, MergeableState};
use std::sync::Arc;

/// One observation of a PR's merge-readiness verdict
#[derive(Debug, Clone)]
pub struct VerdictSnapshot {
    /// GitHub's mergeable state at query time
    pub verdict: MergeableState,
    /// The head revision the verdict was computed against
    pub head_sha: String,
}

/// Source of merge-state observations for one repository
#[async_trait]
pub trait MergeStateSource: Send + Sync {
    /// Fetch the current verdict for a PR, plus the revision it applies to
    async fn query_verdict(&self, pr_number: u64) -> anyhow::Result<VerdictSnapshot>;

    /// Fetch all validation signals attached to a revision
    async fn query_validation_signals(
        &self,
        head_sha: &str,
    ) -> anyhow::Result<Vec<ValidationSignal>>;
}

/// GitHub-backed merge-state source
///
/// Repository coordinates are bound at construction, never read from
/// process-wide state, so independent sessions stay independent.
pub struct GitHubMergeState {
    client: Arc<dyn GitHubClient>,
    owner: String,
    repo: String,
}

impl GitHubMergeState {
    pub fn new(client: Arc<dyn GitHubClient>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            client,
            owner: owner.into(),
            repo: repo.into(),
        }
    }
}

#[async_trait]
impl MergeStateSource for GitHubMergeState {
    async fn query_verdict(&self, pr_number: u64) -> anyhow::Result<VerdictSnapshot> {
        let pr = self
            .client
            .fetch_pull_request(&self.owner, &self.repo, pr_number)
            .await?;

        Ok(VerdictSnapshot {
            verdict: pr.mergeable_state.unwrap_or_default(),
            head_sha: pr.head_sha,
        })
    }

    async fn query_validation_signals(
        &self,
        head_sha: &str,
    ) -> anyhow::Result<Vec<ValidationSignal>> {
        // Both APIs matter: modern CI reports check runs, some systems
        // still report commit statuses.
        let check_runs = self
            .client
            .fetch_check_runs(&self.owner, &self.repo, head_sha)
            .await?;
        let commit_status = self
            .client
            .fetch_commit_status(&self.owner, &self.repo, head_sha)
            .await?;

        let mut signals: Vec<ValidationSignal> =
            check_runs.iter().map(signal_from_check_run).collect();
        signals.extend(signals_from_commit_status(&commit_status));
        Ok(signals)
    }
}
