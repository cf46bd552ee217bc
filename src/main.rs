//! Command-line client for GitHub gists.
//!
//! # Usage
//! ```bash
//! gists ls                          # List your gists
//! gists ls -s 2024-01-01            # Only gists updated since a date
//! gists get <ID> --show-content     # Print one gist with file contents
//! gists create a.py b.py -d "Scratch files"
//! gists update <ID> --add c.py --delete a.py --modify b.py=local/b2.py
//! gists delete <ID>
//! ```
//!
//! # Authentication
//! Requests use HTTP Basic auth. Token resolution order:
//! 1. --token flag (or GITHUB_TOKEN environment variable)
//! 2. --token-file contents
//! 3. GH_TOKEN environment variable
//! 4. gh CLI config (~/.config/gh/hosts.yml)

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use gists::commands;
use gists::GistClient;

#[derive(Parser, Debug)]
#[command(name = "gists")]
#[command(about = "Create, list, update and delete GitHub gists")]
#[command(version)]
struct Cli {
    /// GitHub username the gists belong to
    #[arg(short, long, global = true, env = "GITHUB_USER")]
    username: Option<String>,

    /// Personal access token with the gist scope
    #[arg(short, long, global = true, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Read the token from a file instead of the command line
    #[arg(long, global = true, value_name = "PATH")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Print gists as JSON instead of human-readable text
    #[arg(long)]
    json: bool,

    /// Include file contents in the output
    #[arg(long)]
    show_content: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List your gists
    Ls {
        /// Only list gists updated at or after this time
        #[arg(short, long, value_parser = parse_since, value_name = "TIME")]
        since: Option<DateTime<Utc>>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fetch a single gist
    Get {
        /// Gist id
        id: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Create a gist from local files
    Create {
        /// Files to upload, named after their basenames
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,

        /// Description for the gist
        #[arg(short, long)]
        description: Option<String>,

        /// Create a secret gist instead of a public one
        #[arg(short, long)]
        private: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Update a gist's files or description
    Update {
        /// Gist id
        id: String,

        /// Local files to add, named after their basenames
        #[arg(long, value_name = "FILE", num_args = 1..)]
        add: Vec<PathBuf>,

        /// Filenames to remove from the gist
        #[arg(long, value_name = "NAME", num_args = 1..)]
        delete: Vec<String>,

        /// Replace an existing file with a local one, renaming it
        #[arg(long, value_name = "OLD_NAME=NEW_FILE", num_args = 1..)]
        modify: Vec<String>,

        /// New description for the gist
        #[arg(short, long)]
        description: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete a gist
    Delete {
        /// Gist id
        id: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gists=warn")),
        )
        .init();

    let cli = Cli::parse();

    let username = cli
        .username
        .context("a username is required; pass --username or set GITHUB_USER")?;
    let client = GistClient::new(&username, cli.token, cli.token_file.as_deref())?;

    let runtime = tokio::runtime::Runtime::new().context("failed to start async runtime")?;
    runtime.block_on(run(&client, cli.command))
}

async fn run(client: &GistClient, command: Commands) -> Result<()> {
    match command {
        Commands::Ls { since, output } => {
            commands::ls(client, since, output.json, output.show_content).await
        }
        Commands::Get { id, output } => {
            commands::get(client, &id, output.json, output.show_content).await
        }
        Commands::Create {
            files,
            description,
            private,
            output,
        } => {
            commands::create(
                client,
                &files,
                description.as_deref().unwrap_or_default(),
                !private,
                output.json,
                output.show_content,
            )
            .await
        }
        Commands::Update {
            id,
            add,
            delete,
            modify,
            description,
            output,
        } => {
            commands::update(
                client,
                &id,
                &add,
                &delete,
                &modify,
                description.as_deref(),
                output.json,
                output.show_content,
            )
            .await
        }
        Commands::Delete { id } => commands::delete(client, &id).await,
    }
}

/// Parse a `--since` value. Accepts a date, a date-time, or a full RFC 3339
/// timestamp; values without an offset are taken as UTC.
fn parse_since(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        if let Some(start) = date.and_hms_opt(0, 0, 0) {
            return Ok(start.and_utc());
        }
    }
    Err(format!(
        "`{value}` is not a recognized timestamp; try YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS"
    ))
}
