// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout stays clean for the snapshot)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 2 = error)
//
// Everything network-related is awaited one step at a time, so the program
// behaves like a simple sequential script even though it runs on tokio.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod error; // src/error.rs - snapshot error type
mod github; // src/github/ - GitHub contents API
mod prompt; // src/prompt.rs - wrapping snapshots for a model
mod snapshot; // src/snapshot/ - tree walking and snapshot assembly

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use cli::{Cli, Commands, LimitArgs};
use github::GitHubClient;
use snapshot::Snapshot;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> Result<()> {
    // Parse command-line arguments into our Cli struct
    // This will automatically handle --help, --version, etc.
    let cli = Cli::parse();
    init_logging(&cli);

    // One client for the whole run; the token (if any) rides along on
    // every request it makes
    let client = GitHubClient::new(&cli.api_root, cli.token.clone())?;

    // Match on which subcommand was used
    match cli.command {
        Commands::Snapshot {
            repo_url,
            limits,
            json,
            output,
        } => {
            // Build the snapshot, then print it (or write it to a file)
            let snapshot = take_snapshot(&client, &repo_url, &limits).await?;
            handle_snapshot_output(&snapshot, json, output.as_deref())
        }
        Commands::Prompt {
            repo_url,
            question,
            system,
            limits,
        } => {
            let snapshot = take_snapshot(&client, &repo_url, &limits).await?;

            // Either bake the snapshot into the model's standing orders,
            // or attach it underneath the user's question
            let text = if system {
                prompt::system_instruction(&snapshot.text)
            } else {
                // clap guarantees a question when --system is absent
                prompt::user_turn(question.as_deref().unwrap_or_default(), &snapshot.text)
            };
            println!("{}", text);
            Ok(())
        }
    }
}

// Logs go to stderr. RUST_LOG works as usual; -v and -q override it.
fn init_logging(cli: &Cli) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose {
        builder.filter_level(LevelFilter::Debug);
    } else if cli.quiet {
        builder.filter_level(LevelFilter::Error);
    }
    // reqwest's connection pool chatter drowns out our own debug lines
    builder.filter_module("hyper", LevelFilter::Warn);
    builder.target(env_logger::Target::Stderr).init();
}

async fn take_snapshot(client: &GitHubClient, repo_url: &str, limits: &LimitArgs) -> Result<Snapshot> {
    info!("Fetching repository information for {}", repo_url);

    // Only a bad URL or a failed tree walk ends up in this error;
    // README and per-file problems just make the snapshot smaller
    let snapshot = snapshot::build_snapshot(client, repo_url, &limits.to_options())
        .await
        .with_context(|| format!("Could not build a snapshot of {}", repo_url))?;

    info!(
        "Snapshot of {}: {} chars, {}/{} file(s) embedded, {} skipped{}",
        snapshot.repo,
        snapshot.chars,
        snapshot.files_embedded,
        snapshot.candidates,
        snapshot.files_skipped,
        if snapshot.hit_total_cap { ", size cap reached" } else { "" }
    );
    Ok(snapshot)
}

fn handle_snapshot_output(
    snapshot: &Snapshot,
    json: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    // JSON carries the statistics too; plain mode is just the text
    let rendered = if json {
        serde_json::to_string_pretty(snapshot)?
    } else {
        snapshot.text.clone()
    };

    // stdout by default, so the snapshot can be piped straight into
    // another tool
    match output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Could not write {}", path.display()))?;
            info!("Wrote snapshot to {}", path.display());
        }
        None => print!("{}", rendered),
    }
    Ok(())
}
