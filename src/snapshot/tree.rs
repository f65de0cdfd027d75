// src/snapshot/tree.rs
// =============================================================================
// Walks a repository's directory structure through the contents API.
//
// Produces two things in one pass:
// 1. A printable tree, one entry per line, 4 spaces of indent per level,
//    directories shown as [name/]
// 2. The list of text-like files worth embedding, in discovery order
//
// How it works:
// - An explicit stack replaces recursion, so a pathologically deep repo
//   can't overflow the call stack
// - Children are pushed in reverse, so popping yields them in the order
//   GitHub returned them (we never re-sort)
// - A directory's line is written before its children are fetched, which
//   gives depth-first pre-order: exactly what you'd get from recursion
//
// Anything under a `.github` directory is skipped entirely: not shown,
// not collected, not fetched.
//
// A failed listing anywhere aborts the walk. A partial tree would silently
// misrepresent the repository.
// =============================================================================

use log::debug;

use crate::error::SnapshotError;
use crate::github::{ContentSource, Entry, RepoRef};

/// Files with these extensions are candidates for embedding
pub const TEXT_EXTENSIONS: &[&str] = &[".py", ".html", ".css", ".js", ".jsx", ".rst", ".md"];

/// Repository meta-configuration, never part of the snapshot
const META_DIR: &str = ".github";

pub const INDENT: &str = "    ";

/// A file picked up during the walk, to be fetched later
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFile {
    /// Tree depth, used to indent the embedded block like the tree line
    pub depth: usize,
    pub path: String,
}

/// Everything one walk produces. A fresh one is built for every call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeWalk {
    pub tree: String,
    pub candidates: Vec<CandidateFile>,
}

// Walks the directory at `path` ("" for the repository root)
//
// Parameters:
//   indent: depth of the entries directly under `path` (0 at the root)
pub async fn walk_tree(
    source: &dyn ContentSource,
    repo: &RepoRef,
    path: &str,
    indent: usize,
) -> Result<TreeWalk, SnapshotError> {
    let mut walk = TreeWalk::default();
    let mut stack: Vec<(usize, Entry)> = Vec::new();

    let root = source.fetch_contents(repo, path).await?.into_listing(path)?;
    push_children(&mut stack, root, indent);

    while let Some((depth, entry)) = stack.pop() {
        let pad = INDENT.repeat(depth);

        if entry.is_dir() {
            // Directory line first, then its children (pre-order)
            walk.tree.push_str(&format!("{}[{}/]\n", pad, entry.name));

            let children = source
                .fetch_contents(repo, &entry.path)
                .await?
                .into_listing(&entry.path)?;
            push_children(&mut stack, children, depth + 1);
        } else {
            walk.tree.push_str(&format!("{}{}\n", pad, entry.name));

            if is_text_file(&entry.name) {
                walk.candidates.push(CandidateFile {
                    depth,
                    path: entry.path,
                });
            }
        }
    }

    debug!(
        "walked {}: {} candidate file(s)",
        repo,
        walk.candidates.len()
    );
    Ok(walk)
}

fn push_children(stack: &mut Vec<(usize, Entry)>, entries: Vec<Entry>, depth: usize) {
    for entry in entries.into_iter().rev() {
        if !is_meta_path(&entry.path) {
            stack.push((depth, entry));
        }
    }
}

fn is_meta_path(path: &str) -> bool {
    path.split('/').any(|segment| segment == META_DIR)
}

fn is_text_file(name: &str) -> bool {
    TEXT_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a Vec as a stack?
//    - push() and pop() both work on the end of the Vec, which is O(1)
//    - Last in, first out: the most recently discovered entry is next
//    - That's what makes the walk depth-first
//
// 2. Why return TreeWalk instead of taking &mut Vec from the caller?
//    - Each call owns its own accumulator and hands it back when done
//    - Two walks (even two at the same time) can never see each other's data
//
// 3. What is &dyn ContentSource?
//    - A reference to "some type that implements ContentSource"
//    - The real program passes a GitHubClient, tests pass a MockSource
// -----------------------------------------------------------------------------
