// src/github/mock.rs
// =============================================================================
// An in-memory ContentSource for tests.
//
// Describe a repository with a few builder calls, then hand the mock to
// the tree walker or the snapshot assembler. Every requested path is
// recorded so tests can check what was (and wasn't) fetched.
//
//   let source = MockSource::new()
//       .dir("", &["src/", "README.md"])
//       .dir("src", &["app.py"])
//       .file("src/app.py", "print('hi')")
//       .file("README.md", "# Demo");
// =============================================================================

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use std::sync::Mutex;

use super::contents::{Contents, Encoding, Entry, EntryType};
use super::fetch::ContentSource;
use super::repo_url::RepoRef;
use crate::error::SnapshotError;

enum MockResponse {
    Contents(Contents),
    Status(u16),
}

#[derive(Default)]
pub struct MockSource {
    responses: HashMap<String, MockResponse>,
    requests: Mutex<Vec<String>>,
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", parent, name)
    }
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// A directory listing; child names ending in '/' are directories.
    pub fn dir(mut self, path: &str, children: &[&str]) -> Self {
        let entries = children
            .iter()
            .map(|child| {
                let (name, entry_type) = match child.strip_suffix('/') {
                    Some(name) => (name, EntryType::Dir),
                    None => (*child, EntryType::File),
                };
                Entry {
                    name: name.to_string(),
                    path: join(path, name),
                    entry_type,
                    encoding: None,
                    content: None,
                }
            })
            .collect();
        self.responses
            .insert(path.to_string(), MockResponse::Contents(Contents::Listing(entries)));
        self
    }

    /// A file record whose body is base64-encoded, like GitHub sends it.
    pub fn file(mut self, path: &str, body: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let entry = Entry {
            name,
            path: path.to_string(),
            entry_type: EntryType::File,
            encoding: Some(Encoding::Base64),
            content: Some(STANDARD.encode(body)),
        };
        self.responses
            .insert(path.to_string(), MockResponse::Contents(Contents::File(entry)));
        self
    }

    /// A base64 file record whose bytes (0xff 0xfe) aren't valid UTF-8.
    pub fn undecodable(mut self, path: &str) -> Self {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        let entry = Entry {
            name,
            path: path.to_string(),
            entry_type: EntryType::File,
            encoding: Some(Encoding::Base64),
            content: Some("//4=".to_string()),
        };
        self.responses
            .insert(path.to_string(), MockResponse::Contents(Contents::File(entry)));
        self
    }

    /// Any request for `path` fails with this HTTP status.
    pub fn fail(mut self, path: &str, status: u16) -> Self {
        self.responses
            .insert(path.to_string(), MockResponse::Status(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ContentSource for MockSource {
    async fn fetch_contents(&self, _repo: &RepoRef, path: &str) -> Result<Contents, SnapshotError> {
        self.requests.lock().unwrap().push(path.to_string());
        match self.responses.get(path) {
            Some(MockResponse::Contents(contents)) => Ok(contents.clone()),
            Some(MockResponse::Status(status)) => Err(SnapshotError::Upstream {
                path: path.to_string(),
                status: *status,
            }),
            None => Err(SnapshotError::Upstream {
                path: path.to_string(),
                status: 404,
            }),
        }
    }
}
