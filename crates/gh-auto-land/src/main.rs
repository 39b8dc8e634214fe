//! gh-auto-land: open a PR, wait until GitHub says it's mergeable,
//! approve it and merge it.

use anyhow::Result;
use gh_client::{GitHubClient, OctocrabClient, TokenResolver};
use std::sync::Arc;

mod inputs;
mod land;
mod logger;
mod resolve;

use inputs::Inputs;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    logger::init();

    if let Err(err) = run().await {
        log::error!("{:#}", err);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let inputs = Inputs::from_env()?;

    log::info!(
        "Landing {} -> {} in {}/{}",
        inputs.branch_ref,
        inputs.base,
        inputs.owner,
        inputs.repo
    );

    let action_token = match &inputs.github_token {
        Some(token) => token.clone(),
        None => TokenResolver::new().get_token().await?,
    };
    // The artifact token creates the PR so the action token can approve
    // it; with a single token GitHub refuses self-approval.
    let artifact_token = inputs
        .artifact_github_token
        .clone()
        .unwrap_or_else(|| action_token.clone());

    let action: Arc<dyn GitHubClient> = Arc::new(OctocrabClient::with_token(&action_token)?);
    let artifact: Arc<dyn GitHubClient> = Arc::new(OctocrabClient::with_token(&artifact_token)?);

    land::run(action, artifact, &inputs).await
}
