// src/snapshot/assemble.rs
// =============================================================================
// Builds the repository snapshot: one bounded text blob for an LLM prompt.
//
// Layout of the result:
//
//   README.md:
//   ```
//   <readme, clipped to max_file_chars>
//   ```
//
//   Directory Structure:
//   <tree>
//
//   <path>:            <- one block per embedded file, indented like the tree
//   ```
//   <body, clipped to max_file_chars>
//   ```
//
// Error policy:
// - Bad URL or a failed tree walk: the whole build fails
// - README missing or unreadable: a placeholder line, keep going
// - A single file fails: skip it, keep going (it doesn't use up max_files)
//
// Files are fetched in discovery order. With fetch_concurrency > 1 up to
// that many requests run ahead, but results are still consumed in order,
// so the same files end up in the snapshot either way.
// =============================================================================

use futures::stream::{self, StreamExt};
use log::{info, warn};
use serde::Serialize;

use super::budget::{truncate_with_marker, Budgets, SnapshotText};
use super::tree::{walk_tree, CandidateFile, INDENT};
use crate::error::SnapshotError;
use crate::github::{decode_file, parse_repo_url, ContentSource, RepoRef};

const README_PATH: &str = "README.md";

pub const README_MISSING: &str = "README.md: Not found or error fetching README\n\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotOptions {
    pub budgets: Budgets,
    /// How many file bodies may be in flight at once (1 = strictly sequential)
    pub fetch_concurrency: usize,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            budgets: Budgets::default(),
            fetch_concurrency: 1,
        }
    }
}

/// A finished snapshot plus some numbers about how it was built
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub repo: RepoRef,
    /// Text files found by the tree walk
    pub candidates: usize,
    pub files_embedded: usize,
    /// Files that failed to fetch or decode
    pub files_skipped: usize,
    /// True if total_chars_cap cut the last file block short
    pub hit_total_cap: bool,
    pub chars: usize,
    pub text: String,
}

#[derive(Debug, Default)]
struct FileTally {
    embedded: usize,
    skipped: usize,
    hit_total_cap: bool,
}

// Builds the snapshot for a repository URL
//
// Only two things can make this fail: an unparseable URL, or an error
// while walking the directory tree.
pub async fn build_snapshot(
    source: &dyn ContentSource,
    repo_url: &str,
    options: &SnapshotOptions,
) -> Result<Snapshot, SnapshotError> {
    let repo = parse_repo_url(repo_url)?;
    let budgets = options.budgets;
    let mut text = SnapshotText::new();

    info!("Fetching README for {}", repo);
    match fetch_text(source, &repo, README_PATH).await {
        Ok(readme) => {
            let readme = truncate_with_marker(readme, budgets.max_file_chars);
            text.push(&format!("README.md:\n```\n{}\n```\n\n", readme));
        }
        Err(e) => {
            warn!("No README for {}: {}", repo, e);
            text.push(README_MISSING);
        }
    }

    info!("Walking directory tree of {}", repo);
    let walk = walk_tree(source, &repo, "", 0).await?;
    let tree = match budgets.max_tree_chars {
        Some(max) => truncate_with_marker(walk.tree, max),
        None => walk.tree,
    };
    text.push(&format!("Directory Structure:\n{}\n", tree));

    info!(
        "Embedding up to {} of {} candidate file(s)",
        budgets.max_files,
        walk.candidates.len()
    );
    let tally = embed_files(source, &repo, &walk.candidates, options, &mut text).await;

    Ok(Snapshot {
        repo,
        candidates: walk.candidates.len(),
        files_embedded: tally.embedded,
        files_skipped: tally.skipped,
        hit_total_cap: tally.hit_total_cap,
        chars: text.chars(),
        text: text.into_string(),
    })
}

// Appends file blocks until a budget runs out or candidates run out
async fn embed_files(
    source: &dyn ContentSource,
    repo: &RepoRef,
    candidates: &[CandidateFile],
    options: &SnapshotOptions,
    text: &mut SnapshotText,
) -> FileTally {
    let budgets = options.budgets;
    let mut tally = FileTally::default();

    // buffered() keeps results in input order; a fetch only starts when
    // the stream is polled, so with a width of 1 nothing runs ahead
    let mut fetches = stream::iter(candidates)
        .map(move |candidate| async move {
            let body = fetch_text(source, repo, &candidate.path).await;
            (candidate, body)
        })
        .buffered(options.fetch_concurrency.max(1));

    loop {
        // Check the budgets BEFORE pulling the next result, so a full
        // snapshot never triggers another request
        if tally.embedded >= budgets.max_files || text.chars() >= budgets.total_chars_cap {
            break;
        }

        // None means every candidate has been tried
        let (candidate, body) = match fetches.next().await {
            Some(next) => next,
            None => break,
        };

        // A file that can't be fetched or decoded is skipped, not fatal.
        // It doesn't use up a max_files slot either.
        let body = match body {
            Ok(body) => body,
            Err(e) => {
                warn!("Skipping {}: {}", candidate.path, e);
                tally.skipped += 1;
                continue;
            }
        };

        // Clip the body first, then wrap it in its indented, fenced block
        let block = file_block(candidate, &truncate_with_marker(body, budgets.max_file_chars));

        // A clipped block still counts as embedded, and it's the last one
        tally.embedded += 1;
        if !text.push_capped(&block, budgets.total_chars_cap) {
            info!("Total size cap reached at {}", candidate.path);
            tally.hit_total_cap = true;
            break;
        }
    }

    tally
}

// Fetches one file and decodes it to text
async fn fetch_text(
    source: &dyn ContentSource,
    repo: &RepoRef,
    path: &str,
) -> Result<String, SnapshotError> {
    let entry = source.fetch_contents(repo, path).await?.into_file(path)?;
    decode_file(&entry)
}

fn file_block(candidate: &CandidateFile, body: &str) -> String {
    let pad = INDENT.repeat(candidate.depth);
    format!(
        "\n{pad}{path}:\n{pad}```\n{body}\n{pad}```\n",
        pad = pad,
        path = candidate.path,
        body = body
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::mock::MockSource;
    use crate::snapshot::budget::TRUNCATION_MARKER;
    use pretty_assertions::assert_eq;

    const URL: &str = "https://github.com/acme/widgets";

    fn options(budgets: Budgets) -> SnapshotOptions {
        SnapshotOptions {
            budgets,
            fetch_concurrency: 1,
        }
    }

    fn five_files() -> MockSource {
        MockSource::new()
            .fail("README.md", 404)
            .dir("", &["f1.py", "f2.py", "f3.py", "f4.py", "f5.py"])
            .file("f1.py", "one")
            .file("f2.py", "two")
            .file("f3.py", "three")
            .file("f4.py", "four")
            .file("f5.py", "five")
    }

    #[tokio::test]
    async fn test_snapshot_layout() {
        let source = MockSource::new()
            .dir("", &["README.md", "src/"])
            .dir("src", &["app.py"])
            .file("README.md", "# Demo")
            .file("src/app.py", "print('hi')");

        let snapshot = build_snapshot(&source, URL, &SnapshotOptions::default())
            .await
            .unwrap();

        let expected = concat!(
            "README.md:\n```\n# Demo\n```\n\n",
            "Directory Structure:\n",
            "README.md\n",
            "[src/]\n",
            "    app.py\n",
            "\n",
            "\nREADME.md:\n```\n# Demo\n```\n",
            "\n    src/app.py:\n    ```\nprint('hi')\n    ```\n",
        );
        assert_eq!(snapshot.text, expected);
        assert_eq!(snapshot.chars, expected.chars().count());
        assert_eq!(snapshot.candidates, 2);
        assert_eq!(snapshot.files_embedded, 2);
        assert_eq!(snapshot.repo.to_string(), "acme/widgets");
        assert!(!snapshot.hit_total_cap);
    }

    #[tokio::test]
    async fn test_max_files_limits_embedded_files() {
        let source = five_files();
        let budgets = Budgets {
            max_files: 2,
            ..Budgets::default()
        };

        let snapshot = build_snapshot(&source, URL, &options(budgets)).await.unwrap();

        assert_eq!(snapshot.files_embedded, 2);
        assert!(snapshot.text.contains("\nf1.py:\n```\none\n```\n"));
        assert!(snapshot.text.contains("\nf2.py:\n```\ntwo\n```\n"));
        assert!(!snapshot.text.contains("three"));
        // Sequential mode never fetches past the limit
        assert_eq!(source.requests(), vec!["README.md", "", "f1.py", "f2.py"]);
    }

    #[tokio::test]
    async fn test_failed_file_is_skipped() {
        let source = MockSource::new()
            .fail("README.md", 500)
            .dir("", &["a.py", "gone.py", "b.py"])
            .file("a.py", "alpha")
            .fail("gone.py", 404)
            .file("b.py", "beta");
        let budgets = Budgets {
            max_files: 2,
            ..Budgets::default()
        };

        let snapshot = build_snapshot(&source, URL, &options(budgets)).await.unwrap();

        // The failed file doesn't use up a max_files slot
        assert_eq!(snapshot.files_embedded, 2);
        assert_eq!(snapshot.files_skipped, 1);
        assert!(snapshot.text.contains("alpha"));
        assert!(snapshot.text.contains("beta"));
        assert!(!snapshot.text.contains("\ngone.py:"));
        // Still listed in the tree
        assert!(snapshot.text.contains("Directory Structure:\na.py\ngone.py\nb.py\n"));
    }

    #[tokio::test]
    async fn test_undecodable_readme_gets_placeholder() {
        let source = MockSource::new()
            .undecodable("README.md")
            .dir("", &["a.py"])
            .file("a.py", "alpha");

        let snapshot = build_snapshot(&source, URL, &SnapshotOptions::default())
            .await
            .unwrap();

        assert!(snapshot.text.starts_with(README_MISSING));
        assert_eq!(snapshot.files_embedded, 1);
    }

    #[tokio::test]
    async fn test_undecodable_files_are_skipped() {
        // One body isn't UTF-8, and one "file" path answers with a listing
        let source = MockSource::new()
            .dir("README.md", &[])
            .dir("", &["bad.py", "x.py", "y.py"])
            .undecodable("bad.py")
            .dir("x.py", &[])
            .file("y.py", "why");

        let snapshot = build_snapshot(&source, URL, &SnapshotOptions::default())
            .await
            .unwrap();

        assert!(snapshot.text.starts_with(README_MISSING));
        assert_eq!(snapshot.files_skipped, 2);
        assert_eq!(snapshot.files_embedded, 1);
        assert!(snapshot.text.ends_with("\ny.py:\n```\nwhy\n```\n"));
        assert!(!snapshot.text.contains("\nbad.py:"));
        assert!(!snapshot.text.contains("\nx.py:"));
    }

    #[tokio::test]
    async fn test_file_body_truncated_to_max_file_chars() {
        let body = format!("abcdefghij{}", "k".repeat(40));
        let source = MockSource::new()
            .dir("", &["long.py"])
            .file("long.py", &body);
        let budgets = Budgets {
            max_file_chars: 10,
            ..Budgets::default()
        };

        let snapshot = build_snapshot(&source, URL, &options(budgets)).await.unwrap();

        let expected_block = format!("\nlong.py:\n```\nabcdefghij{}\n```\n", TRUNCATION_MARKER);
        assert!(snapshot.text.ends_with(&expected_block));
        assert!(!snapshot.text.contains('k'));
    }

    #[tokio::test]
    async fn test_readme_placeholder_and_truncation() {
        let missing = MockSource::new().dir("", &[]);
        let snapshot = build_snapshot(&missing, URL, &SnapshotOptions::default())
            .await
            .unwrap();
        assert_eq!(
            snapshot.text,
            format!("{}Directory Structure:\n\n", README_MISSING)
        );

        let long = MockSource::new()
            .dir("", &[])
            .file("README.md", &"r".repeat(30));
        let budgets = Budgets {
            max_file_chars: 5,
            ..Budgets::default()
        };
        let snapshot = build_snapshot(&long, URL, &options(budgets)).await.unwrap();
        assert!(snapshot
            .text
            .starts_with(&format!("README.md:\n```\nrrrrr{}\n```\n\n", TRUNCATION_MARKER)));
    }

    #[tokio::test]
    async fn test_total_cap_clips_last_block() {
        let source = MockSource::new()
            .dir("", &["a.py", "b.py"])
            .file("a.py", &"x".repeat(10))
            .file("b.py", "never");
        let prefix = format!("{}Directory Structure:\na.py\nb.py\n\n", README_MISSING);
        let cap = prefix.chars().count() + 25;
        let budgets = Budgets {
            total_chars_cap: cap,
            ..Budgets::default()
        };

        let snapshot = build_snapshot(&source, URL, &options(budgets)).await.unwrap();

        // The full a.py block is 26 chars; one gets cut
        let block = format!("\na.py:\n```\n{}\n```", "x".repeat(10));
        assert_eq!(snapshot.text, format!("{}{}", prefix, block));
        assert_eq!(snapshot.chars, cap);
        assert!(snapshot.hit_total_cap);
        assert_eq!(snapshot.files_embedded, 1);
        assert!(!source.requests().contains(&"b.py".to_string()));
    }

    #[tokio::test]
    async fn test_cap_reached_before_files() {
        let source = five_files();
        let budgets = Budgets {
            total_chars_cap: 10,
            ..Budgets::default()
        };

        let snapshot = build_snapshot(&source, URL, &options(budgets)).await.unwrap();

        assert_eq!(snapshot.files_embedded, 0);
        assert!(snapshot.text.ends_with("f5.py\n\n"));
        assert_eq!(source.requests(), vec!["README.md", ""]);
    }

    #[tokio::test]
    async fn test_tree_cap() {
        let source = five_files();
        let budgets = Budgets {
            max_files: 0,
            max_tree_chars: Some(6),
            ..Budgets::default()
        };

        let snapshot = build_snapshot(&source, URL, &options(budgets)).await.unwrap();

        assert_eq!(
            snapshot.text,
            format!("{}Directory Structure:\nf1.py\n{}\n", README_MISSING, TRUNCATION_MARKER)
        );
    }

    #[tokio::test]
    async fn test_prefetch_keeps_discovery_order() {
        let build = |concurrency: usize| async move {
            let source = five_files().fail("f2.py", 502);
            let options = SnapshotOptions {
                budgets: Budgets {
                    max_files: 3,
                    ..Budgets::default()
                },
                fetch_concurrency: concurrency,
            };
            build_snapshot(&source, URL, &options).await.unwrap()
        };

        let sequential = build(1).await;
        let parallel = build(4).await;

        assert_eq!(sequential.text, parallel.text);
        assert_eq!(parallel.files_embedded, 3);
        assert!(parallel.text.contains("four"));
        assert!(!parallel.text.contains("five"));
    }

    #[tokio::test]
    async fn test_invalid_url_fails_before_any_fetch() {
        let source = five_files();
        let result = build_snapshot(&source, "https://github.com/acme", &SnapshotOptions::default()).await;

        assert!(matches!(result, Err(SnapshotError::InvalidReference(_))));
        assert!(source.requests().is_empty());
    }

    #[tokio::test]
    async fn test_tree_failure_fails_the_build() {
        let source = MockSource::new()
            .file("README.md", "hello")
            .dir("", &["lib/"])
            .fail("lib", 500);

        let result = build_snapshot(&source, URL, &SnapshotOptions::default()).await;

        assert!(matches!(result, Err(SnapshotError::Upstream { status: 500, .. })));
    }
}
