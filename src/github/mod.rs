// src/github/mod.rs
// =============================================================================
// This module talks to the GitHub contents API.
//
// Submodules:
// - repo_url: Parsing repository URLs to extract owner/repo
// - contents: JSON record types and the file decoder (base64 -> text)
// - fetch: The ContentSource trait and its reqwest-backed implementation
//
// Nothing in here knows about budgets or snapshots; that lives in
// src/snapshot/.
// =============================================================================

mod contents;
mod fetch;
mod repo_url;

#[cfg(test)]
pub mod mock;

pub use contents::{decode_file, Entry};
pub use fetch::{ContentSource, GitHubClient, DEFAULT_API_ROOT};
pub use repo_url::{parse_repo_url, RepoRef};
