// src/github/fetch.rs
// =============================================================================
// This module fetches records from the GitHub contents API.
//
// Strategy:
// - Build GET {api_root}/repos/{owner}/{repo}/contents/{path}
// - Ask for the v3 JSON representation
// - Attach the token as a Bearer header when we have one
// - Any non-2xx status becomes SnapshotError::Upstream with the status code
//
// The rest of the crate only sees the ContentSource trait, so tests can
// swap in an in-memory source and never touch the network.
//
// No retries here. If a request fails, the caller decides whether that's
// fatal (tree walk) or just means "skip this file".
// =============================================================================

use async_trait::async_trait;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Client, RequestBuilder};
use std::time::Duration;
use url::Url;

use super::contents::Contents;
use super::repo_url::RepoRef;
use crate::error::SnapshotError;

pub const DEFAULT_API_ROOT: &str = "https://api.github.com";

const ACCEPT_V3_JSON: &str = "application/vnd.github.v3+json";

/// Anything that can answer "what is at this path in this repository?"
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Returns the file record or directory listing at `path`.
    ///
    /// `path` is repository-relative; the empty string is the root.
    async fn fetch_contents(&self, repo: &RepoRef, path: &str) -> Result<Contents, SnapshotError>;
}

/// ContentSource backed by the real GitHub REST API
pub struct GitHubClient {
    client: Client,
    api_root: Url,
    token: Option<String>,
}

impl GitHubClient {
    // Creates a client for the given API root
    //
    // Parameters:
    //   api_root: e.g. "https://api.github.com" or a GitHub Enterprise "/api/v3" URL
    //   token: optional bearer credential, passed along on every request
    pub fn new(api_root: &str, token: Option<String>) -> anyhow::Result<Self> {
        let api_root = Url::parse(api_root)
            .map_err(|e| anyhow::anyhow!("Invalid API root '{}': {}", api_root, e))?;

        // GitHub rejects API requests without a User-Agent
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_root,
            // An empty GH_API_KEY means "no token", not "send an empty header"
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    // Builds (but doesn't send) the request for one path
    fn request(&self, repo: &RepoRef, path: &str) -> Result<RequestBuilder, SnapshotError> {
        let url = contents_url(&self.api_root, repo, path)?;
        let mut request = self.client.get(url).header(ACCEPT, ACCEPT_V3_JSON);
        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token));
        }
        Ok(request)
    }
}

#[async_trait]
impl ContentSource for GitHubClient {
    async fn fetch_contents(&self, repo: &RepoRef, path: &str) -> Result<Contents, SnapshotError> {
        debug!("GET contents {}:/{}", repo, path);

        let transport = |source| SnapshotError::Transport {
            path: path.to_string(),
            source,
        };

        let response = self.request(repo, path)?.send().await.map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SnapshotError::Upstream {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        // Read the body first so a malformed payload is a Decode error,
        // not a Transport error
        let body = response.bytes().await.map_err(transport)?;
        serde_json::from_slice(&body)
            .map_err(|e| SnapshotError::decode(path, format!("unexpected JSON: {}", e)))
    }
}

// Builds the contents URL for a path
//
// Each path segment is appended separately so characters like spaces or
// '#' get percent-encoded instead of breaking the URL.
//
// Example:
//   ("https://api.github.com", acme/widgets, "docs/my guide.md")
//   -> https://api.github.com/repos/acme/widgets/contents/docs/my%20guide.md
pub fn contents_url(api_root: &Url, repo: &RepoRef, path: &str) -> Result<Url, SnapshotError> {
    let mut url = api_root.clone();
    {
        let mut segments = url.path_segments_mut().map_err(|_| {
            SnapshotError::InvalidReference(format!("API root '{}' cannot take a path", api_root))
        })?;
        segments
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
    }
    Ok(url)
}
