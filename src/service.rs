//! Wiki service orchestration.
//!
//! Composes the repository, access filter, normalizer, and content
//! mirror into the operations the excluded request layer calls:
//! list, view, search, create, edit, archive, history. Each request is
//! a single pass with no retries; the caller's group memberships arrive
//! as an explicit parameter on every operation that needs them.
//!
//! Writes flow one way — repository first, then the content mirror —
//! and the mirror is best-effort: when it fails after the repository
//! write succeeded, the operation still succeeds and reports
//! [`SyncStatus::Degraded`] instead of rolling anything back.

use std::collections::BTreeSet;

use sqlx::SqlitePool;
use tracing::warn;

use crate::access;
use crate::config::Config;
use crate::db;
use crate::error::{WikiError, WikiResult};
use crate::models::{Entry, HistoryEntry};
use crate::repo;
use crate::slug;
use crate::sync::ContentSync;

/// Outcome of the content-mirror write that follows a successful
/// repository write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// Working tree matches the entry text and is committed.
    Committed,
    /// The repository write succeeded but the mirror did not. The entry
    /// is live and correct; its on-disk copy lags until the next
    /// successful sync.
    Degraded(String),
}

impl SyncStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(self, SyncStatus::Degraded(_))
    }
}

/// The storage and access-control core, one instance per process.
pub struct WikiService {
    pool: SqlitePool,
    sync: ContentSync,
}

impl WikiService {
    pub fn new(pool: SqlitePool, sync: ContentSync) -> Self {
        Self { pool, sync }
    }

    /// Connect to the database and content root described by `config`.
    pub async fn open(config: &Config) -> anyhow::Result<Self> {
        let pool = db::connect(config).await?;
        Ok(Self::new(pool, ContentSync::new(config)))
    }

    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Entries visible to `caller_groups`, newest first.
    pub async fn list_visible(&self, caller_groups: &BTreeSet<String>) -> WikiResult<Vec<Entry>> {
        let all = repo::list_all(&self.pool).await?;
        Ok(access::visible_entries(caller_groups, &all))
    }

    /// View the single entry with this exact slug.
    ///
    /// An entry the caller cannot see is reported as not found rather
    /// than forbidden, so reads do not reveal which slugs exist. A slug
    /// shared by several readable entries is reported as ambiguous
    /// instead of being silently resolved to an arbitrary one.
    pub async fn view_one(
        &self,
        slug: &str,
        caller_groups: &BTreeSet<String>,
    ) -> WikiResult<Entry> {
        let matches = repo::find_by_slug(&self.pool, slug).await?;
        let mut readable: Vec<Entry> = matches
            .into_iter()
            .filter(|e| access::can_access(caller_groups, e))
            .collect();

        match readable.len() {
            0 => Err(WikiError::not_found(slug)),
            1 => Ok(readable.remove(0)),
            _ => Err(WikiError::Ambiguous(slug.to_string())),
        }
    }

    /// Fuzzy slug search, filtered down to what the caller may see.
    pub async fn search(
        &self,
        pattern: &str,
        caller_groups: &BTreeSet<String>,
    ) -> WikiResult<Vec<Entry>> {
        let matches = repo::search_slug(&self.pool, pattern).await?;
        Ok(access::visible_entries(caller_groups, &matches))
    }

    /// Create a new entry and mirror it into the content root.
    ///
    /// The slug is computed here, once, and validated before anything
    /// is written. Authentication is the collaborator's problem; by the
    /// time this runs the caller is allowed to create entries.
    pub async fn create_entry(
        &self,
        title: &str,
        text: &str,
        allowed_groups: &BTreeSet<String>,
    ) -> WikiResult<(Entry, SyncStatus)> {
        let slug = slug::normalize(title);
        validate_slug(title, &slug)?;

        let entry = repo::create(&self.pool, title, &slug, text, allowed_groups).await?;
        let status = self.mirror(&entry.slug, &entry.text, true);
        Ok((entry, status))
    }

    /// Replace the text and allowed groups of the entry with this exact
    /// slug, then mirror the new text.
    ///
    /// Slug and uid never change. The caller's whole group set is
    /// checked against the entry's grants; matching on any shared group
    /// suffices.
    pub async fn edit_entry(
        &self,
        slug: &str,
        text: &str,
        allowed_groups: &BTreeSet<String>,
        caller_groups: &BTreeSet<String>,
    ) -> WikiResult<(Entry, SyncStatus)> {
        let matches = repo::find_by_slug(&self.pool, slug).await?;
        if matches.is_empty() {
            return Err(WikiError::not_found(slug));
        }

        let mut editable: Vec<Entry> = matches
            .into_iter()
            .filter(|e| access::can_access(caller_groups, e))
            .collect();
        if editable.is_empty() {
            return Err(WikiError::Forbidden(slug.to_string()));
        }
        if editable.len() > 1 {
            return Err(WikiError::Ambiguous(slug.to_string()));
        }

        let mut entry = editable.remove(0);
        let groups = repo::update(&self.pool, &entry.uid, text, allowed_groups).await?;
        entry.text = text.to_string();
        entry.allowed_groups = groups;

        let status = self.mirror(&entry.slug, &entry.text, false);
        Ok((entry, status))
    }

    /// Archive every live entry with this exact slug.
    ///
    /// The copy into `archived_entries` and the delete from `entries`
    /// are one transaction. The working tree is intentionally left
    /// untouched: the file and its commit history remain on disk as an
    /// audit trail after the live rows are gone. Returns the number of
    /// entries archived.
    pub async fn archive_entry(
        &self,
        slug: &str,
        caller_groups: &BTreeSet<String>,
    ) -> WikiResult<u64> {
        let matches = repo::find_by_slug(&self.pool, slug).await?;
        if matches.is_empty() {
            return Err(WikiError::not_found(slug));
        }
        // Archiving removes every match, so the caller needs access to
        // every match.
        if !matches.iter().all(|e| access::can_access(caller_groups, e)) {
            return Err(WikiError::Forbidden(slug.to_string()));
        }

        repo::archive(&self.pool, slug).await
    }

    /// Commit history for a slug's file, newest first, read from the
    /// content mirror only. Works even for archived entries and even
    /// when the database is unavailable.
    pub fn history(&self, slug: &str) -> WikiResult<Vec<HistoryEntry>> {
        Ok(self.sync.history(slug)?)
    }

    fn mirror(&self, slug: &str, text: &str, is_new_file: bool) -> SyncStatus {
        match self.sync.sync(slug, text, is_new_file) {
            Ok(()) => SyncStatus::Committed,
            Err(e) => {
                warn!(
                    slug = %slug,
                    error = %e,
                    "content mirror write failed; database remains authoritative"
                );
                SyncStatus::Degraded(e.to_string())
            }
        }
    }
}

/// Reject titles whose slug cannot serve as a lookup key and file name.
///
/// The normalizer is total, so the unusable cases are caught here: an
/// empty slug, or one carrying a path separator or dot-segment that
/// would escape the content root.
fn validate_slug(title: &str, slug: &str) -> WikiResult<()> {
    if slug.is_empty() {
        return Err(WikiError::validation(format!(
            "title '{}' normalizes to an empty slug",
            title
        )));
    }
    if slug.contains('/') || slug.contains('\\') || slug == "." || slug == ".." {
        return Err(WikiError::validation(format!(
            "title '{}' normalizes to an unsafe slug '{}'",
            title, slug
        )));
    }
    Ok(())
}
