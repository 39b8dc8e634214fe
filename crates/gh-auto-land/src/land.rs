//! Landing orchestration
//!
//! The straight-line sequence around the resolution engine: open the
//! PR, label it, wait for a definitive merge-readiness outcome, then
//! approve and merge. Any non-clean outcome stops the run before the
//! approval step; a merge is never submitted after a rejection or a
//! timeout.

use crate::inputs::Inputs;
use crate::resolve::{
    BackoffSchedule, GitHubMergeState, MergeReadinessSession, ResolutionOutcome, MAX_ATTEMPTS,
};
use anyhow::{bail, Context, Result};
use gh_client::{GitHubClient, ReviewEvent};
use log::{info, warn};
use std::sync::Arc;

/// Run one landing end to end.
///
/// `artifact` creates and labels the PR; `action` reads, approves and
/// merges it. The two may be the same client when only one token is
/// configured, but approving your own PR requires them to differ.
pub async fn run(
    action: Arc<dyn GitHubClient>,
    artifact: Arc<dyn GitHubClient>,
    inputs: &Inputs,
) -> Result<()> {
    let pr = artifact
        .create_pull_request(
            &inputs.owner,
            &inputs.repo,
            &inputs.branch_ref,
            &inputs.base,
            &inputs.title,
            inputs.body.as_deref(),
        )
        .await
        .context("failed to create pull request")?;

    info!(
        "Created PR #{} ({} -> {}) in {}/{}",
        pr.number, inputs.branch_ref, inputs.base, inputs.owner, inputs.repo
    );

    if let Some(label) = &inputs.label {
        // Labeling is cosmetic; a failure here must not abort the landing
        if let Err(err) = artifact
            .add_labels(&inputs.owner, &inputs.repo, pr.number, &[label.clone()])
            .await
        {
            warn!("failed to label PR #{}: {:#}", pr.number, err);
        }
    }

    let source = GitHubMergeState::new(Arc::clone(&action), &inputs.owner, &inputs.repo);
    let session = MergeReadinessSession::new(source)
        .with_schedule(BackoffSchedule::default())
        .with_skip_checks(inputs.skip_checks.clone());

    match session
        .resolve(pr.number)
        .await
        .context("could not observe merge state")?
    {
        ResolutionOutcome::Clean => {}
        ResolutionOutcome::Rejected(reason) => {
            bail!("PR #{} rejected: {}", pr.number, reason);
        }
        ResolutionOutcome::TimedOut => {
            bail!(
                "PR #{} mergeable state still unknown after {} attempts",
                pr.number,
                MAX_ATTEMPTS
            );
        }
    }

    info!("Approving PR #{}", pr.number);
    action
        .create_review(
            &inputs.owner,
            &inputs.repo,
            pr.number,
            ReviewEvent::Approve,
            None,
        )
        .await
        .context("failed to approve pull request")?;

    info!("Merging PR #{}", pr.number);
    let result = action
        .merge_pull_request(&inputs.owner, &inputs.repo, pr.number, inputs.merge_method)
        .await
        .context("failed to merge pull request")?;

    if !result.merged {
        bail!("merge of PR #{} was not performed: {}", pr.number, result.message);
    }

    info!("PR #{} merged: {}", pr.number, result.message);
    Ok(())
}
