// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - snapshot: print the bounded repository text (or JSON with stats)
// - prompt: wrap that text around a question, ready to send to a model
//
// Options shared by both (token, API root, verbosity) are global, so they
// can go before or after the subcommand.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::github::DEFAULT_API_ROOT;
use crate::snapshot::{Budgets, SnapshotOptions};

#[derive(Parser, Debug)]
#[command(
    name = "repo-explainer",
    version,
    about = "Turn a GitHub repository into a bounded text snapshot for LLM prompts",
    long_about = "repo-explainer reads a repository's README, directory tree and a capped set of \
                  source files through the GitHub contents API, and assembles them into a single \
                  block of text that fits in a language-model prompt."
)]
pub struct Cli {
    /// GitHub token, sent as a Bearer credential (raises API rate limits)
    #[arg(long, global = true, env = "GH_API_KEY", hide_env_values = true)]
    pub token: Option<String>,

    /// Base URL of the GitHub REST API (change for GitHub Enterprise)
    #[arg(long, global = true, env = "GITHUB_API_URL", default_value = DEFAULT_API_ROOT)]
    pub api_root: String,

    /// Show debug logging on stderr
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the repository snapshot
    ///
    /// Example: repo-explainer snapshot https://github.com/acme/widgets --max-files 20
    Snapshot {
        /// Repository URL (e.g., https://github.com/owner/repo)
        repo_url: String,

        #[command(flatten)]
        limits: LimitArgs,

        /// Print the snapshot and its statistics as JSON
        #[arg(long)]
        json: bool,

        /// Write the output (text, or JSON with --json) to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Build the snapshot and wrap it into a model prompt
    ///
    /// Example: repo-explainer prompt https://github.com/acme/widgets -Q "What does app.py do?"
    Prompt {
        /// Repository URL (e.g., https://github.com/owner/repo)
        repo_url: String,

        /// The question to ask about the repository
        #[arg(short = 'Q', long, required_unless_present = "system")]
        question: Option<String>,

        /// Print the system instruction instead of a user turn
        #[arg(long)]
        system: bool,

        #[command(flatten)]
        limits: LimitArgs,
    },
}

/// Size limits, shared by every subcommand that builds a snapshot
#[derive(Args, Debug, Clone)]
pub struct LimitArgs {
    /// Maximum number of files embedded (README not counted)
    #[arg(long, default_value_t = 80)]
    pub max_files: usize,

    /// Maximum characters kept from any single file
    #[arg(long, default_value_t = 15_000)]
    pub max_file_chars: usize,

    /// Maximum characters in the whole snapshot
    #[arg(long, default_value_t = 200_000)]
    pub total_chars_cap: usize,

    /// Maximum characters in the directory tree section (default: unlimited)
    #[arg(long)]
    pub max_tree_chars: Option<usize>,

    /// How many files to fetch at once (results keep discovery order)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..=32))]
    pub concurrency: u16,
}

impl LimitArgs {
    pub fn to_options(&self) -> SnapshotOptions {
        SnapshotOptions {
            budgets: Budgets {
                max_files: self.max_files,
                max_file_chars: self.max_file_chars,
                total_chars_cap: self.total_chars_cap,
                max_tree_chars: self.max_tree_chars,
            },
            fetch_concurrency: usize::from(self.concurrency),
        }
    }
}
