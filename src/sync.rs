//! Git-mirrored content store.
//!
//! Every successful entry write is mirrored as a committed file change
//! under the content root, one file per slug. The mirror is a replica:
//! SQLite stays authoritative, and a mirror failure degrades the
//! request instead of failing it (the caller decides how to surface
//! that — see [`crate::service::SyncStatus`]).
//!
//! Git is driven through the `git` binary. The operations used are
//! open/init repository, stage file, query-dirty, and commit with
//! message and author; everything else about git is treated as a black
//! box.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Mutex;

use crate::config::Config;
use crate::models::HistoryEntry;

/// Mirrors entry text into a git working tree.
pub struct ContentSync {
    root: PathBuf,
    author_name: String,
    author_email: String,
    // Serializes write+stage+commit per content root, so two requests
    // cannot commit a half-written file from each other.
    lock: Mutex<()>,
}

impl ContentSync {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.content.root.clone(),
            author_name: config.git.author_name.clone(),
            author_email: config.git.author_email.clone(),
            lock: Mutex::new(()),
        }
    }

    /// Create the content root and initialize its repository if either
    /// is missing. Idempotent.
    pub fn ensure_repo(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create content root: {}", self.root.display()))?;
        if !self.root.join(".git").exists() {
            git(&self.root, &["init", "--quiet"])?;
        }
        Ok(())
    }

    /// Mirror `text` into the file for `slug` and commit if the working
    /// tree changed.
    ///
    /// The write is a full overwrite. A new file is touched empty first,
    /// then written; an existing file is just rewritten. The file is
    /// staged on every sync, not only when it is new — an edit may be
    /// the first sync that actually reaches a file whose create was
    /// degraded, and an unstaged file would keep every later commit
    /// failing. Nothing is committed when the tree is already clean, so
    /// writing identical text is a no-op at the git layer.
    pub fn sync(&self, slug: &str, text: &str, is_new_file: bool) -> Result<()> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        self.ensure_repo()?;

        let file_path = self.root.join(slug);
        if is_new_file && !file_path.exists() {
            std::fs::File::create(&file_path)
                .with_context(|| format!("Failed to create file: {}", file_path.display()))?;
        }
        std::fs::write(&file_path, text)
            .with_context(|| format!("Failed to write file: {}", file_path.display()))?;

        git(&self.root, &["add", "--", slug])?;

        if self.is_dirty()? {
            self.commit(&format!("Change to \"{}\".", slug))?;
        }

        Ok(())
    }

    /// Per-file commit log, newest first.
    ///
    /// Reads only the git side, so history stays available even when
    /// the database is not — and survives the live row being archived.
    pub fn history(&self, slug: &str) -> Result<Vec<HistoryEntry>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let output = git(
            &self.root,
            &["log", "--follow", "--format=%h\t%ct\t%an\t%s", "--", slug],
        )?;

        let mut entries = Vec::new();
        for line in output.lines() {
            let mut fields = line.splitn(4, '\t');
            let (commit, ts, author, message) = (
                fields.next().unwrap_or_default(),
                fields.next().unwrap_or_default(),
                fields.next().unwrap_or_default(),
                fields.next().unwrap_or_default(),
            );
            entries.push(HistoryEntry {
                commit: commit.to_string(),
                timestamp: ts.parse().unwrap_or(0),
                author: author.to_string(),
                message: message.to_string(),
            });
        }
        Ok(entries)
    }

    fn is_dirty(&self) -> Result<bool> {
        let output = git(&self.root, &["status", "--porcelain"])?;
        Ok(!output.trim().is_empty())
    }

    fn commit(&self, message: &str) -> Result<()> {
        let author = format!("{} <{}>", self.author_name, self.author_email);
        let name_cfg = format!("user.name={}", self.author_name);
        let email_cfg = format!("user.email={}", self.author_email);
        git(
            &self.root,
            &[
                "-c",
                &name_cfg,
                "-c",
                &email_cfg,
                "commit",
                "--all",
                "--quiet",
                "--author",
                &author,
                "--message",
                message,
            ],
        )?;
        Ok(())
    }
}

fn git(repo_dir: &Path, args: &[&str]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(repo_dir)
        .output()
        .with_context(|| "Failed to execute 'git'. Is git installed?")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "git {} failed: {}",
            subcommand(args),
            stderr.trim()
        );
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// The actual git subcommand in `args`, skipping any leading
/// `-c key=value` configuration pairs.
fn subcommand<'a>(args: &[&'a str]) -> &'a str {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        if *arg == "-c" {
            iter.next();
            continue;
        }
        return arg;
    }
    ""
}
