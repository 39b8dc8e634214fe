//! Action inputs
//!
//! Configuration arrives GitHub-Action style: each `foo-bar` input is
//! read from the `INPUT_FOO_BAR` environment variable. Everything the
//! run needs is collected into one `Inputs` value up front; nothing
//! downstream reads the environment.

use anyhow::{Context, Result};
use gh_client::MergeMethod;
use std::env;

/// Default target branch when the `base` input is empty
const DEFAULT_BASE_BRANCH: &str = "master";

/// All inputs for one landing run
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Head branch the PR is created from
    pub branch_ref: String,
    /// Base branch the PR targets
    pub base: String,
    /// PR title
    pub title: String,
    /// PR body
    pub body: Option<String>,
    /// Label to attach to the PR (empty = no labeling)
    pub label: Option<String>,
    /// How to merge once the PR is ready
    pub merge_method: MergeMethod,
    /// Check names excluded from merge-readiness aggregation, typically
    /// the workflow running this tool
    pub skip_checks: Vec<String>,
    /// Token used to read, approve and merge
    pub github_token: Option<String>,
    /// Token used to create and label the PR; falls back to `github_token`
    pub artifact_github_token: Option<String>,
}

impl Inputs {
    /// Load inputs from the environment
    pub fn from_env() -> Result<Self> {
        let owner = required("github-owner")?;
        let repo = required("github-repo")?;
        let branch_ref = required("branch-ref")?;

        let base = input("base").unwrap_or_else(|| DEFAULT_BASE_BRANCH.to_string());
        let title =
            input("title").unwrap_or_else(|| format!("Automated update from {}", branch_ref));
        let body = input("body");
        let label = input("label");
        let merge_method = input("merge-method")
            .map(|s| MergeMethod::parse(&s))
            .unwrap_or_default();
        let skip_checks = input("skip-checks")
            .map(|s| {
                s.split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let github_token = input("github-token");
        let artifact_github_token = input("artifact-github-token");

        Ok(Self {
            owner,
            repo,
            branch_ref,
            base,
            title,
            body,
            label,
            merge_method,
            skip_checks,
            github_token,
            artifact_github_token,
        })
    }
}

/// Read one action input; empty strings count as absent
fn input(name: &str) -> Option<String> {
    let key = format!("INPUT_{}", name.replace('-', "_").to_uppercase());
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &str) -> Result<String> {
    input(name).with_context(|| format!("missing required input '{}'", name))
}
