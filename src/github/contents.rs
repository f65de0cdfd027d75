// src/github/contents.rs
// =============================================================================
// Types for the GitHub contents API and the file decoder.
//
// GET /repos/{owner}/{repo}/contents/{path} answers with either:
// - a JSON object (a single file record, body usually base64-encoded), or
// - a JSON array (a directory listing, entries without bodies)
//
// We only deserialize the fields we actually use; serde ignores the rest.
// =============================================================================

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;

use crate::error::SnapshotError;

/// What kind of thing an entry is.
///
/// Anything GitHub adds in the future lands in `Other` instead of
/// failing the whole listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// How the `content` field is encoded.
///
/// GitHub uses "base64" for normal files and "none" for files too large
/// to inline. Everything that isn't base64 is returned as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Base64,
    #[serde(other)]
    Raw,
}

/// One record from the contents API
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Entry {
    pub name: String,
    /// Repository-relative path, e.g. "src/app.py"
    pub path: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    #[serde(default)]
    pub encoding: Option<Encoding>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Entry {
    pub fn is_dir(&self) -> bool {
        self.entry_type == EntryType::Dir
    }
}

/// A contents API response: a directory listing or a single file.
///
/// `untagged` tries the variants in order, so an array always becomes a
/// listing and an object always becomes a file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Contents {
    Listing(Vec<Entry>),
    File(Entry),
}

impl Contents {
    /// Unwraps a file record; a listing at this path is a decode error.
    pub fn into_file(self, path: &str) -> Result<Entry, SnapshotError> {
        match self {
            Contents::File(entry) => Ok(entry),
            Contents::Listing(_) => Err(SnapshotError::decode(
                path,
                "expected a file but found a directory",
            )),
        }
    }

    /// Unwraps a directory listing; a file at this path is a decode error.
    pub fn into_listing(self, path: &str) -> Result<Vec<Entry>, SnapshotError> {
        match self {
            Contents::Listing(entries) => Ok(entries),
            Contents::File(_) => Err(SnapshotError::decode(
                path,
                "expected a directory but found a file",
            )),
        }
    }
}

// Converts a file record into plain text
//
// base64 bodies are decoded and must be valid UTF-8. Anything else is
// returned verbatim. No truncation happens here; callers apply their
// own budget.
pub fn decode_file(entry: &Entry) -> Result<String, SnapshotError> {
    let content = entry
        .content
        .as_deref()
        .ok_or_else(|| SnapshotError::decode(&entry.path, "record has no content"))?;

    match entry.encoding {
        Some(Encoding::Base64) => {
            // GitHub wraps base64 at 60 columns
            let compact: String = content
                .chars()
                .filter(|c| !c.is_ascii_whitespace())
                .collect();
            let bytes = STANDARD
                .decode(compact)
                .map_err(|e| SnapshotError::decode(&entry.path, format!("bad base64: {}", e)))?;
            String::from_utf8(bytes)
                .map_err(|_| SnapshotError::decode(&entry.path, "content is not valid UTF-8"))
        }
        Some(Encoding::Raw) | None => Ok(content.to_string()),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What is #[serde(untagged)]?
//    - Normally serde expects enums to say which variant they are
//    - untagged means "try each variant until one fits"
//    - GitHub doesn't tag its responses, the shape (array vs object) is the tag
//
// 2. What is #[serde(other)]?
//    - A catch-all variant for unknown strings
//    - Lets us survive new values like a future "type": "lfs"
//
// 3. Why Option<String> for content?
//    - Directory listings don't include file bodies
//    - #[serde(default)] fills in None when the field is missing
// -----------------------------------------------------------------------------
