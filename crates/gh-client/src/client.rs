//! GitHub client trait
//!
//! This module defines the core `GitHubClient` trait that all client
//! implementations must satisfy. The landing engine only ever talks to
//! this trait, so it can be driven by fakes in tests.

use crate::types::{
    CheckRun, CheckStatus, MergeMethod, MergeResult, PullRequest, ReviewEvent,
};
use async_trait::async_trait;

/// GitHub API client trait
///
/// Defines the interface for interacting with the GitHub API.
/// Implementations can be direct (hitting the API) or decorated
/// with retry logic, instrumentation, etc.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` to allow sharing across
/// async tasks.
#[async_trait]
pub trait GitHubClient: Send + Sync {
    /// Fetch a single pull request by number
    ///
    /// This returns full PR details including `mergeable_state`, which
    /// GitHub computes asynchronously and which may still be `unknown`.
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest>;

    /// Create a pull request
    ///
    /// # Arguments
    ///
    /// * `head` - Branch (or `user:branch`) the changes live on
    /// * `base` - Branch to merge into
    /// * `title` - PR title
    /// * `body` - Optional PR description
    ///
    /// The PR is created with `maintainer_can_modify` set, so that
    /// maintainers can push fixups to the head branch.
    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> anyhow::Result<PullRequest>;

    /// Add labels to a pull request (issues and PRs share label endpoints)
    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()>;

    /// Fetch CI check runs for a specific commit (Checks API)
    async fn fetch_check_runs(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<Vec<CheckRun>>;

    /// Fetch combined commit status (legacy Status API)
    ///
    /// Some CI systems still report through commit statuses rather than
    /// check runs, so merge-readiness inspection needs both.
    async fn fetch_commit_status(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<CheckStatus>;

    /// Create a review on a pull request
    async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        event: ReviewEvent,
        body: Option<&str>,
    ) -> anyhow::Result<()>;

    /// Merge a pull request
    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<MergeResult>;
}
