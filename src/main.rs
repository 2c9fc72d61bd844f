//! # Wicket CLI
//!
//! Thin request layer over the wiki storage core. In production this
//! role belongs to an HTTP frontend; the CLI stands in for it, which is
//! why every command that reads or mutates entries takes `--groups`:
//! the caller's group memberships are whatever the authentication
//! collaborator said they are, passed through explicitly.
//!
//! ## Usage
//!
//! ```bash
//! wicket --config ./wicket.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `wicket init` | Create the SQLite database and content-root repository |
//! | `wicket list` | List entries visible to the caller |
//! | `wicket view <slug>` | Show one entry by exact slug |
//! | `wicket search <pattern>` | Fuzzy (substring) slug search |
//! | `wicket add` | Create an entry |
//! | `wicket edit <slug>` | Replace an entry's text and allowed groups |
//! | `wicket archive <slug>` | Move an entry to the archive |
//! | `wicket history <slug>` | Per-file commit log from the content mirror |

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use wicket::config;
use wicket::models::{join_groups, parse_groups, Entry};
use wicket::service::{SyncStatus, WikiService};
use wicket::sync::ContentSync;

/// Wicket — a group-scoped wiki with a git-mirrored content store.
#[derive(Parser)]
#[command(
    name = "wicket",
    about = "A group-scoped wiki storage core with a git-mirrored content store",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./wicket.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema and the content-root repository.
    ///
    /// Idempotent — running it multiple times is safe.
    Init,

    /// List entries visible to the caller, newest first.
    List {
        /// Caller's group memberships, comma-separated. Empty means
        /// anonymous, which sees nothing.
        #[arg(long, default_value = "")]
        groups: String,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Show a single entry by exact slug.
    View {
        /// Entry slug (the normalized title).
        slug: String,

        /// Caller's group memberships, comma-separated.
        #[arg(long, default_value = "")]
        groups: String,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Fuzzy slug search: substring match, visibility-filtered.
    Search {
        /// Substring to look for in slugs.
        pattern: String,

        /// Caller's group memberships, comma-separated.
        #[arg(long, default_value = "")]
        groups: String,

        /// Emit JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Create a new entry.
    Add {
        /// Raw display title; the slug is derived from it once.
        #[arg(long)]
        title: String,

        /// Entry text (source markup).
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the entry text from a file instead.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Groups allowed to view the entry, comma-separated. The
        /// privileged group is always added.
        #[arg(long, default_value = "")]
        allowed: String,
    },

    /// Replace an entry's text and allowed groups.
    Edit {
        /// Entry slug (exact match).
        slug: String,

        /// New entry text.
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the new text from a file instead.
        #[arg(long)]
        file: Option<PathBuf>,

        /// New allowed groups, comma-separated.
        #[arg(long, default_value = "")]
        allowed: String,

        /// Caller's group memberships, comma-separated.
        #[arg(long, default_value = "")]
        groups: String,
    },

    /// Move every entry with this slug into the archive.
    ///
    /// The content-root file and its history stay behind as an audit
    /// trail.
    Archive {
        /// Entry slug (exact match).
        slug: String,

        /// Caller's group memberships, comma-separated.
        #[arg(long, default_value = "")]
        groups: String,
    },

    /// Show the commit log for a slug's file in the content mirror.
    History {
        /// Entry slug.
        slug: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            wicket::db::run_migrations(&cfg).await?;
            ContentSync::new(&cfg).ensure_repo()?;
            println!("Database and content root initialized.");
        }
        Commands::List { groups, json } => {
            let service = WikiService::open(&cfg).await?;
            let entries = service.list_visible(&parse_groups(&groups)).await?;
            print_entries(&entries, json)?;
        }
        Commands::View { slug, groups, json } => {
            let service = WikiService::open(&cfg).await?;
            let entry = service.view_one(&slug, &parse_groups(&groups)).await?;
            print_entry(&entry, json)?;
        }
        Commands::Search {
            pattern,
            groups,
            json,
        } => {
            let service = WikiService::open(&cfg).await?;
            let entries = service.search(&pattern, &parse_groups(&groups)).await?;
            print_entries(&entries, json)?;
        }
        Commands::Add {
            title,
            text,
            file,
            allowed,
        } => {
            let body = read_body(text, file)?;
            let service = WikiService::open(&cfg).await?;
            let (entry, status) = service
                .create_entry(&title, &body, &parse_groups(&allowed))
                .await?;
            println!("Created '{}' (uid {}).", entry.slug, entry.uid);
            report_sync(&status);
        }
        Commands::Edit {
            slug,
            text,
            file,
            allowed,
            groups,
        } => {
            let body = read_body(text, file)?;
            let service = WikiService::open(&cfg).await?;
            let (entry, status) = service
                .edit_entry(&slug, &body, &parse_groups(&allowed), &parse_groups(&groups))
                .await?;
            println!("Saved edits to '{}'.", entry.slug);
            report_sync(&status);
        }
        Commands::Archive { slug, groups } => {
            let service = WikiService::open(&cfg).await?;
            let moved = service.archive_entry(&slug, &parse_groups(&groups)).await?;
            println!("Archived {} entr{} for '{}'.", moved, plural_y(moved), slug);
        }
        Commands::History { slug } => {
            let service = WikiService::open(&cfg).await?;
            let log = service.history(&slug)?;
            if log.is_empty() {
                println!("No history for '{}'.", slug);
            }
            for line in &log {
                println!(
                    "{}  {}  {}  {}",
                    line.commit,
                    format_ts(line.timestamp),
                    line.author,
                    line.message
                );
            }
        }
    }

    Ok(())
}

fn read_body(text: Option<String>, file: Option<PathBuf>) -> Result<String> {
    match (text, file) {
        (Some(t), _) => Ok(t),
        (None, Some(path)) => Ok(std::fs::read_to_string(path)?),
        (None, None) => anyhow::bail!("provide the entry text with --text or --file"),
    }
}

fn print_entries(entries: &[Entry], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entries)?);
        return Ok(());
    }
    if entries.is_empty() {
        println!("No entries visible.");
        return Ok(());
    }
    for entry in entries {
        println!(
            "{}  [{}]  {}",
            entry.slug,
            join_groups(&entry.allowed_groups),
            entry.title
        );
    }
    Ok(())
}

fn print_entry(entry: &Entry, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(entry)?);
        return Ok(());
    }
    println!("title:  {}", entry.title);
    println!("slug:   {}", entry.slug);
    println!("uid:    {}", entry.uid);
    println!("groups: {}", join_groups(&entry.allowed_groups));
    println!();
    println!("{}", entry.text);
    Ok(())
}

fn report_sync(status: &SyncStatus) {
    if let SyncStatus::Degraded(reason) = status {
        eprintln!(
            "warning: content mirror is out of date ({}); the entry is live in the database",
            reason
        );
    }
}

fn format_ts(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%SZ").to_string())
        .unwrap_or_else(|| ts.to_string())
}

fn plural_y(n: u64) -> &'static str {
    if n == 1 {
        "y"
    } else {
        "ies"
    }
}
