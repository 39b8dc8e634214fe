//! GitHub API client for automated PR landing
//!
//! This crate provides a trait-based GitHub API client. The landing
//! engine depends only on the `GitHubClient` trait, so it can be driven
//! against fakes in tests; `OctocrabClient` is the production
//! implementation.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            GitHubClient trait            │
//! │  - fetch_pull_request()                  │
//! │  - create_pull_request() / add_labels()  │
//! │  - fetch_check_runs() / commit_status()  │
//! │  - create_review() / merge_pull_request()│
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//!           ┌─────────────────┐
//!           │ OctocrabClient  │
//!           │ (direct API)    │
//!           └─────────────────┘
//! ```

pub mod client;
pub mod octocrab_client;
pub mod token;
pub mod types;

pub use client::GitHubClient;
pub use octocrab_client::OctocrabClient;
pub use token::TokenResolver;
pub use types::{
    CheckConclusion, CheckRun, CheckRunStatus, CheckState, CheckStatus, CommitStatus, MergeMethod,
    MergeResult, MergeableState, PullRequest, ReviewEvent,
};

// Re-export octocrab so consumers don't need to depend on it directly
pub use octocrab;
