// src/github/repo_url.rs
// =============================================================================
// Turns a repository URL into an owner/name pair.
//
// Supported formats:
//   - https://github.com/owner/repo
//   - https://github.com/owner/repo.git
//   - https://github.com/owner/repo/tree/main/src   (extra segments ignored)
//   - github.com/owner/repo                         (scheme optional)
//   - owner/repo                                    (bare path)
//
// We don't check the host: GitHub Enterprise lives on other domains and the
// API root is configured separately. Only the path matters here.
// =============================================================================

use serde::Serialize;
use std::fmt;
use url::{ParseError, Url};

use crate::error::SnapshotError;

/// A repository on the hosting service, e.g. `acme/widgets`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoRef {
    pub owner: String,
    pub name: String,
}

impl fmt::Display for RepoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// Parses a repository URL to extract owner and repository name
//
// Returns: RepoRef on success, InvalidReference if the URL has fewer than
// two non-empty path segments.
//
// Example:
//   "https://github.com/acme/widgets.git" -> RepoRef { owner: "acme", name: "widgets" }
pub fn parse_repo_url(input: &str) -> Result<RepoRef, SnapshotError> {
    let input = input.trim();

    // "github.com/owner/repo" and "owner/repo" have no scheme, so url
    // treats them as relative
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(&absolutize(input))
            .map_err(|e| SnapshotError::InvalidReference(format!("{}: {}", input, e)))?,
        Err(e) => {
            return Err(SnapshotError::InvalidReference(format!("{}: {}", input, e)));
        }
    };

    // path_segments() is None for URLs like "mailto:x" that have no path
    let mut segments = url
        .path_segments()
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty());

    match (segments.next(), segments.next()) {
        (Some(owner), Some(name)) => {
            let name = name.strip_suffix(".git").unwrap_or(name);
            if name.is_empty() {
                return Err(SnapshotError::InvalidReference(format!(
                    "{}: empty repository name",
                    input
                )));
            }
            Ok(RepoRef {
                owner: owner.to_string(),
                name: name.to_string(),
            })
        }
        _ => Err(SnapshotError::InvalidReference(format!(
            "{}: expected a URL like https://github.com/owner/repo",
            input
        ))),
    }
}

// Adds a scheme (and a host, if missing) to scheme-less input
//
// A first segment with a dot is a host ("github.com/a/b"). GitHub owner
// names can't contain dots, so anything else is a bare "owner/repo" path.
fn absolutize(input: &str) -> String {
    let path = input.trim_start_matches('/');
    let first = path.split('/').next().unwrap_or_default();
    if first.contains('.') {
        format!("https://{}", path)
    } else {
        format!("https://github.com/{}", path)
    }
}
