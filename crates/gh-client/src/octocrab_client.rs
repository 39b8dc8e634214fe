//! Octocrab-based GitHub API client
//!
//! Direct implementation of the `GitHubClient` trait using the octocrab
//! library. This client makes real API calls with no retry logic of its
//! own; bounded retrying lives in the landing engine.

use crate::client::GitHubClient;
use crate::types::{
    CheckConclusion, CheckRun, CheckRunStatus, CheckState, CheckStatus, CommitStatus, MergeMethod,
    MergeResult, MergeableState, PullRequest, ReviewEvent,
};
use anyhow::Context;
use async_trait::async_trait;
use log::debug;
use octocrab::Octocrab;
use std::sync::Arc;

/// Direct GitHub API client using octocrab
#[derive(Debug, Clone)]
pub struct OctocrabClient {
    octocrab: Arc<Octocrab>,
}

impl OctocrabClient {
    /// Create a new client with the given octocrab instance
    pub fn new(octocrab: Arc<Octocrab>) -> Self {
        Self { octocrab }
    }

    /// Build a client authenticated with a personal access token
    pub fn with_token(token: &str) -> anyhow::Result<Self> {
        let octocrab = Octocrab::builder()
            .personal_token(token.to_string())
            .build()
            .context("Failed to build octocrab client")?;
        Ok(Self::new(Arc::new(octocrab)))
    }
}

#[async_trait]
impl GitHubClient for OctocrabClient {
    async fn fetch_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
    ) -> anyhow::Result<PullRequest> {
        debug!("Fetching PR #{} for {}/{}", pr_number, owner, repo);

        let pr = self.octocrab.pulls(owner, repo).get(pr_number).await?;
        Ok(convert_pull_request(&pr))
    }

    async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        head: &str,
        base: &str,
        title: &str,
        body: Option<&str>,
    ) -> anyhow::Result<PullRequest> {
        debug!(
            "Creating PR {} -> {} in {}/{}: {:?}",
            head, base, owner, repo, title
        );

        let pulls = self.octocrab.pulls(owner, repo);
        let mut request = pulls
            .create(title, head, base)
            .maintainer_can_modify(true);

        if let Some(body) = body {
            request = request.body(body);
        }

        let pr = request.send().await?;
        Ok(convert_pull_request(&pr))
    }

    async fn add_labels(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        labels: &[String],
    ) -> anyhow::Result<()> {
        debug!(
            "Adding labels {:?} to PR #{} in {}/{}",
            labels, pr_number, owner, repo
        );

        self.octocrab
            .issues(owner, repo)
            .add_labels(pr_number, labels)
            .await?;
        Ok(())
    }

    async fn fetch_check_runs(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<Vec<CheckRun>> {
        debug!(
            "Fetching check runs for {}/{} @ {}",
            owner, repo, commit_sha
        );

        let checks = self
            .octocrab
            .checks(owner, repo)
            .list_check_runs_for_git_ref(commit_sha.to_string().into())
            .send()
            .await?;

        let runs = checks
            .check_runs
            .into_iter()
            .map(|run| {
                // The list endpoint doesn't expose a typed status field;
                // derive it from the timestamps instead.
                let status = if run.completed_at.is_some() {
                    CheckRunStatus::Completed
                } else if run.started_at.is_some() {
                    CheckRunStatus::InProgress
                } else {
                    CheckRunStatus::Queued
                };

                CheckRun {
                    id: run.id.0,
                    name: run.name,
                    status,
                    conclusion: run.conclusion.as_ref().map(|c| convert_conclusion_string(c)),
                    started_at: run.started_at,
                    completed_at: run.completed_at,
                }
            })
            .collect();

        Ok(runs)
    }

    async fn fetch_commit_status(
        &self,
        owner: &str,
        repo: &str,
        commit_sha: &str,
    ) -> anyhow::Result<CheckStatus> {
        debug!(
            "Fetching commit status for {}/{} @ {}",
            owner, repo, commit_sha
        );

        // Use a raw GET since octocrab's Reference type doesn't support commit SHAs
        let route = format!("/repos/{}/{}/commits/{}/status", owner, repo, commit_sha);
        let status: octocrab::models::CombinedStatus =
            self.octocrab.get(route, None::<&()>).await?;

        let state = convert_status_state(&status.state);
        let statuses = status
            .statuses
            .into_iter()
            .map(|s| CommitStatus {
                context: s.context.unwrap_or_else(|| "unknown".to_string()),
                state: convert_status_state(&s.state),
                description: s.description,
            })
            .collect();

        Ok(CheckStatus {
            state,
            total_count: status.total_count as u64,
            statuses,
        })
    }

    async fn create_review(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        event: ReviewEvent,
        body: Option<&str>,
    ) -> anyhow::Result<()> {
        debug!(
            "Creating {:?} review on PR #{} in {}/{}",
            event, pr_number, owner, repo
        );

        // octocrab has no typed review-creation endpoint; POST the route directly
        let route = format!("/repos/{}/{}/pulls/{}/reviews", owner, repo, pr_number);
        let mut payload = serde_json::json!({ "event": event.as_str() });
        if let Some(body) = body {
            payload["body"] = serde_json::Value::String(body.to_string());
        }

        let _: serde_json::Value = self.octocrab.post(route, Some(&payload)).await?;
        Ok(())
    }

    async fn merge_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pr_number: u64,
        merge_method: MergeMethod,
    ) -> anyhow::Result<MergeResult> {
        debug!(
            "Merging PR #{} in {}/{} via {:?}",
            pr_number, owner, repo, merge_method
        );

        let merge = self
            .octocrab
            .pulls(owner, repo)
            .merge(pr_number)
            .method(convert_merge_method(merge_method))
            .send()
            .await?;

        Ok(MergeResult {
            merged: merge.merged,
            sha: merge.sha,
            message: merge.message.unwrap_or_default(),
        })
    }
}

/// Convert octocrab PullRequest to our PullRequest type
fn convert_pull_request(pr: &octocrab::models::pulls::PullRequest) -> PullRequest {
    PullRequest {
        number: pr.number,
        title: pr.title.clone().unwrap_or_default(),
        author: pr
            .user
            .as_ref()
            .map(|u| u.login.clone())
            .unwrap_or_else(|| "unknown".to_string()),
        head_sha: pr.head.sha.clone(),
        base_branch: pr.base.ref_field.clone(),
        head_branch: pr.head.ref_field.clone(),
        mergeable: pr.mergeable,
        mergeable_state: pr.mergeable_state.as_ref().map(convert_mergeable_state),
        html_url: pr
            .html_url
            .as_ref()
            .map(|u| u.to_string())
            .unwrap_or_default(),
    }
}

/// Convert octocrab MergeableState enum to our enum
fn convert_mergeable_state(state: &octocrab::models::pulls::MergeableState) -> MergeableState {
    use octocrab::models::pulls::MergeableState as OMS;
    match state {
        OMS::Clean => MergeableState::Clean,
        OMS::Behind => MergeableState::Behind,
        OMS::Dirty => MergeableState::Dirty,
        OMS::Blocked => MergeableState::Blocked,
        OMS::Unstable => MergeableState::Unstable,
        OMS::Unknown => MergeableState::Unknown,
        _ => MergeableState::Unknown,
    }
}

/// Convert our merge method to octocrab's parameter enum
fn convert_merge_method(method: MergeMethod) -> octocrab::params::pulls::MergeMethod {
    use octocrab::params::pulls::MergeMethod as OMM;
    match method {
        MergeMethod::Merge => OMM::Merge,
        MergeMethod::Squash => OMM::Squash,
        MergeMethod::Rebase => OMM::Rebase,
    }
}

/// Convert conclusion string from GitHub API to our enum
fn convert_conclusion_string(conclusion: &str) -> CheckConclusion {
    match conclusion.to_lowercase().as_str() {
        "success" => CheckConclusion::Success,
        "failure" => CheckConclusion::Failure,
        "neutral" => CheckConclusion::Neutral,
        "cancelled" => CheckConclusion::Cancelled,
        "skipped" => CheckConclusion::Skipped,
        "timed_out" => CheckConclusion::TimedOut,
        "action_required" => CheckConclusion::ActionRequired,
        "stale" => CheckConclusion::Stale,
        _ => CheckConclusion::Neutral,
    }
}

/// Convert octocrab StatusState to our CheckState
fn convert_status_state(state: &octocrab::models::StatusState) -> CheckState {
    match state {
        octocrab::models::StatusState::Success => CheckState::Success,
        octocrab::models::StatusState::Pending => CheckState::Pending,
        octocrab::models::StatusState::Failure => CheckState::Failure,
        octocrab::models::StatusState::Error => CheckState::Error,
        _ => CheckState::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_conclusion_string() {
        assert_eq!(convert_conclusion_string("success"), CheckConclusion::Success);
        assert_eq!(convert_conclusion_string("SUCCESS"), CheckConclusion::Success);
        assert_eq!(convert_conclusion_string("failure"), CheckConclusion::Failure);
        assert_eq!(convert_conclusion_string("cancelled"), CheckConclusion::Cancelled);
        assert_eq!(convert_conclusion_string("timed_out"), CheckConclusion::TimedOut);
        assert_eq!(
            convert_conclusion_string("action_required"),
            CheckConclusion::ActionRequired
        );
        assert_eq!(convert_conclusion_string("garbage"), CheckConclusion::Neutral);
    }

    #[test]
    fn test_convert_merge_method() {
        use octocrab::params::pulls::MergeMethod as OMM;
        assert!(matches!(convert_merge_method(MergeMethod::Merge), OMM::Merge));
        assert!(matches!(convert_merge_method(MergeMethod::Squash), OMM::Squash));
        assert!(matches!(convert_merge_method(MergeMethod::Rebase), OMM::Rebase));
    }
}
