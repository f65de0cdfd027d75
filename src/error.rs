// src/error.rs
// =============================================================================
// Errors that can happen while building a repository snapshot.
//
// There are three kinds of failure the rest of the code cares about:
// - InvalidReference: the URL doesn't name a repository (always fatal)
// - Upstream / Transport: GitHub said no, or we never got an answer
// - Decode: we got an answer but couldn't turn it into text
//
// Whether an error is fatal depends on WHERE it happens, not on its kind.
// The snapshot assembler tolerates errors for the README and for single
// files, but a failure while walking the directory tree aborts everything.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The repository URL has fewer than two path segments
    #[error("invalid repository reference: {0}")]
    InvalidReference(String),

    /// GitHub answered with a non-success status code
    #[error("GitHub returned HTTP {status} for '{path}'")]
    Upstream { path: String, status: u16 },

    /// The request never produced a status (DNS, TLS, timeout, ...)
    #[error("request for '{path}' failed: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response could not be turned into text
    #[error("could not decode '{path}': {reason}")]
    Decode { path: String, reason: String },
}

impl SnapshotError {
    pub fn decode(path: &str, reason: impl Into<String>) -> Self {
        SnapshotError::Decode {
            path: path.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_path() {
        let err = SnapshotError::Upstream {
            path: "src/lib.py".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "GitHub returned HTTP 404 for 'src/lib.py'");

        let err = SnapshotError::decode("a.md", "invalid UTF-8");
        assert_eq!(err.to_string(), "could not decode 'a.md': invalid UTF-8");
    }
}
