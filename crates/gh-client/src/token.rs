//! GitHub token resolution
//!
//! Resolves an API token from the environment, falling back to the
//! `gh` CLI's stored credentials for local development.

use anyhow::{Context, Result};
use log::debug;

/// Resolves a GitHub token for github.com
///
/// Tries sources in order:
/// 1. `GITHUB_TOKEN` env var
/// 2. `GH_TOKEN` env var
/// 3. `gh auth token` command
#[derive(Debug, Clone, Default)]
pub struct TokenResolver;

impl TokenResolver {
    /// Create a new token resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve a token, or fail with a hint on how to provide one
    pub async fn get_token(&self) -> Result<String> {
        if let Ok(token) = std::env::var("GITHUB_TOKEN").or_else(|_| std::env::var("GH_TOKEN")) {
            if !token.is_empty() {
                debug!("Using token from GITHUB_TOKEN/GH_TOKEN");
                return Ok(token);
            }
        }

        debug!("Trying gh auth token");
        let output = tokio::process::Command::new("gh")
            .args(["auth", "token"])
            .output()
            .await
            .context("Failed to run 'gh auth token'")?;

        if output.status.success() {
            let token = String::from_utf8(output.stdout)
                .context("Invalid UTF-8 in gh auth token output")?
                .trim()
                .to_string();
            if !token.is_empty() {
                debug!("Using token from gh CLI");
                return Ok(token);
            }
        }

        Err(anyhow::anyhow!(
            "No GitHub token found. Set GITHUB_TOKEN or run 'gh auth login'"
        ))
    }
}
