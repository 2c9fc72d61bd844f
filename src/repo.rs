//! Entry repository: SQLite-backed live and archived entry storage.
//!
//! All statements are parameterized; no SQL is built from raw input.
//! Lookup comes in two named flavors: [`find_by_slug`] matches the slug
//! exactly and is what view/edit/archive use, while [`search_slug`] is
//! the substring "fuzzy" lookup reserved for the explicit search
//! feature. Visibility filtering happens above this layer, in
//! [`crate::access`], over the rows these functions return.

use std::collections::BTreeSet;

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::access::PRIVILEGED_GROUP;
use crate::error::{WikiError, WikiResult};
use crate::models::{join_groups, parse_groups, Entry};

fn row_to_entry(row: &SqliteRow) -> Entry {
    let allowed_groups: String = row.get("allowed_groups");
    Entry {
        uid: row.get("uid"),
        title: row.get("title"),
        slug: row.get("slug"),
        text: row.get("text"),
        allowed_groups: parse_groups(&allowed_groups),
    }
}

/// Insert a new entry and return it.
///
/// The slug was computed exactly once by the caller and is stored
/// as-is; it is never recomputed. The privileged group is always added
/// to `allowed_groups` before the row is written, so the visibility
/// invariant holds no matter what the creator asked for. Slug
/// uniqueness is deliberately not enforced.
pub async fn create(
    pool: &SqlitePool,
    title: &str,
    slug: &str,
    text: &str,
    allowed_groups: &BTreeSet<String>,
) -> WikiResult<Entry> {
    let mut groups = allowed_groups.clone();
    groups.insert(PRIVILEGED_GROUP.to_string());

    let uid = Uuid::new_v4().simple().to_string();

    sqlx::query(
        "INSERT INTO entries (uid, title, slug, text, allowed_groups) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&uid)
    .bind(title)
    .bind(slug)
    .bind(text)
    .bind(join_groups(&groups))
    .execute(pool)
    .await?;

    Ok(Entry {
        uid,
        title: title.to_string(),
        slug: slug.to_string(),
        text: text.to_string(),
        allowed_groups: groups,
    })
}

/// Fetch every live entry, newest first.
pub async fn list_all(pool: &SqlitePool) -> WikiResult<Vec<Entry>> {
    let rows = sqlx::query(
        "SELECT uid, title, slug, text, allowed_groups FROM entries ORDER BY id DESC",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_entry).collect())
}

/// Exact-slug lookup, oldest first.
///
/// Duplicate slugs are legal, so this returns every match and leaves
/// resolution to the caller.
pub async fn find_by_slug(pool: &SqlitePool, slug: &str) -> WikiResult<Vec<Entry>> {
    let rows = sqlx::query(
        "SELECT uid, title, slug, text, allowed_groups FROM entries WHERE slug = ? ORDER BY id ASC",
    )
    .bind(slug)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_entry).collect())
}

/// Fuzzy slug lookup: wildcard-wrapped substring match.
///
/// Short or generic patterns match many entries, which is exactly what
/// the search feature wants and exactly why nothing else uses this.
pub async fn search_slug(pool: &SqlitePool, pattern: &str) -> WikiResult<Vec<Entry>> {
    let like = format!("%{}%", pattern);
    let rows = sqlx::query(
        "SELECT uid, title, slug, text, allowed_groups FROM entries WHERE slug LIKE ? ORDER BY id ASC",
    )
    .bind(&like)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(row_to_entry).collect())
}

/// In-place text/ACL mutation of the entry with this uid.
///
/// Slug and uid are immutable post-creation, so only `text` and
/// `allowed_groups` change. The privileged group is re-added on every
/// update; an edit cannot lock administrators out.
pub async fn update(
    pool: &SqlitePool,
    uid: &str,
    text: &str,
    allowed_groups: &BTreeSet<String>,
) -> WikiResult<BTreeSet<String>> {
    let mut groups = allowed_groups.clone();
    groups.insert(PRIVILEGED_GROUP.to_string());

    let result = sqlx::query("UPDATE entries SET text = ?, allowed_groups = ? WHERE uid = ?")
        .bind(text)
        .bind(join_groups(&groups))
        .bind(uid)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(WikiError::not_found(uid));
    }
    Ok(groups)
}

/// Move every live entry matching `slug` into `archived_entries`.
///
/// Copy and delete run inside a single transaction, so a partial
/// archive is never observable: either all matching rows move with
/// their uids intact, or the live table is untouched. Returns the
/// number of entries archived.
pub async fn archive(pool: &SqlitePool, slug: &str) -> WikiResult<u64> {
    let mut tx = pool.begin().await?;

    let copied = sqlx::query("INSERT INTO archived_entries SELECT * FROM entries WHERE slug = ?")
        .bind(slug)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    if copied == 0 {
        tx.rollback().await?;
        return Err(WikiError::not_found(slug));
    }

    sqlx::query("DELETE FROM entries WHERE slug = ?")
        .bind(slug)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(copied)
}
