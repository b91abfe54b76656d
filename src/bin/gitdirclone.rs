//! CLI for gitdirclone.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gitdirclone::config::resolve_token;
use gitdirclone::github::DEFAULT_API_URL;
use gitdirclone::prelude::*;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gitdirclone")]
#[command(author, version, about = "Clone a specific directory from a GitHub repository", long_about = None)]
struct Cli {
    /// GitHub API base URL (for GitHub Enterprise)
    #[arg(long, global = true, env = "GITDIRCLONE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Print debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download a directory from a GitHub repository
    Clone {
        /// GitHub repo in the form <owner>/<repo>
        repo: RepoRef,

        /// Path to the directory inside the repo
        directory: String,

        /// Branch name
        #[arg(short, long, default_value = DEFAULT_BRANCH)]
        branch: String,

        /// Output directory (defaults to the last segment of <DIRECTORY>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Set, remove or check the stored GitHub token
    Config {
        /// Personal access token to store
        #[arg(short, long, conflicts_with = "remove")]
        token: Option<String>,

        /// Remove the stored token
        #[arg(short, long)]
        remove: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Clone {
            repo,
            directory,
            branch,
            output,
        } => cmd_clone(&cli.api_url, repo, directory, branch, output),
        Commands::Config { token, remove } => cmd_config(token, remove),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report(&err),
    }
}

fn init_logging(verbose: bool) {
    let default_directive = if verbose { "gitdirclone=debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_clone(
    api_url: &str,
    repo: RepoRef,
    directory: String,
    branch: String,
    output: Option<PathBuf>,
) -> Result<()> {
    let store = SettingsStore::locate();
    if store.is_none() {
        warn!("no config directory; using GITHUB_TOKEN if set");
    }
    let token = resolve_token(store.as_ref(), std::env::var("GITHUB_TOKEN").ok())
        .with_context(|| match &store {
            Some(store) => format!("Failed to read settings from {}", store.path().display()),
            None => "Failed to resolve token".to_string(),
        })?;
    let client = GitHubClient::with_base_url(token, api_url)?;

    let mut request = CloneRequest::new(repo, directory).branch(branch);
    if let Some(output) = output {
        request = request.output(output);
    }

    println!(
        "Fetching directory {} from {}@{}",
        request.directory, request.repo, request.branch
    );

    let summary = DirectoryCloner::new(&client)
        .on_event(print_event)
        .clone_directory(&request)?;

    println!(
        "Finished cloning into: '{}' directory! ({} files, {} bytes)",
        summary.root.display(),
        summary.files,
        summary.bytes
    );

    Ok(())
}

fn print_event(event: &CloneEvent) {
    match event {
        CloneEvent::FileDownloaded { path, .. } => println!("Downloaded {}", path),
        CloneEvent::DirectoryFinished { path } => {
            println!("Directory {} successfully cloned.", path)
        }
        CloneEvent::Skipped { path, kind } => {
            println!("Skipped {} ({})", path, format!("{:?}", kind).to_lowercase())
        }
        CloneEvent::DirectoryStarted { .. } => {}
    }
}

fn cmd_config(token: Option<String>, remove: bool) -> Result<()> {
    let store = SettingsStore::new()?;

    if let Some(token) = token {
        store
            .set_token(&token)
            .with_context(|| format!("Failed to save token to {}", store.path().display()))?;
        println!("Token saved");
    } else if remove {
        let removed = store
            .remove_token()
            .with_context(|| format!("Failed to update {}", store.path().display()))?;
        println!("{}", if removed { "Token removed" } else { "No token configured" });
    } else {
        let configured = store
            .has_token()
            .with_context(|| format!("Failed to read settings from {}", store.path().display()))?;
        println!("{}", if configured { "Configured" } else { "Not configured" });
    }

    Ok(())
}

/// Print the error chain and any hint to stderr, returning the exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    // Our error messages already embed their source, so skip repeated text
    let mut message = String::new();
    for cause in err.chain() {
        let text = cause.to_string();
        if message.contains(&text) {
            continue;
        }
        if !message.is_empty() {
            message.push_str(": ");
        }
        message.push_str(&text);
    }
    eprintln!("Error: {}", message);

    let clone_error = err.chain().find_map(|c| c.downcast_ref::<DirCloneError>());
    if let Some(hint) = clone_error.and_then(DirCloneError::hint) {
        eprintln!("Hint: {}", hint);
    }

    ExitCode::from(clone_error.map_or(1, DirCloneError::exit_code))
}
