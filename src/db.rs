//! Database connection and schema.
//!
//! SQLite is the authoritative store for entries. The schema keeps
//! `archived_entries` shaped identically to `entries` so archiving is a
//! plain `INSERT ... SELECT` inside one transaction.

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::Config;

pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let db_path = &config.db.path;

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", db_path.display()))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create the database file and all tables. Idempotent.
pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Apply the schema to an already-open pool.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            text TEXT NOT NULL,
            allowed_groups TEXT NOT NULL DEFAULT 'admin'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Archive rows carry the original id and uid; AUTOINCREMENT ids are
    // never reused, so the copied id stays unique here too.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS archived_entries (
            id INTEGER PRIMARY KEY,
            uid TEXT NOT NULL UNIQUE,
            title TEXT NOT NULL,
            slug TEXT NOT NULL,
            text TEXT NOT NULL,
            allowed_groups TEXT NOT NULL DEFAULT 'admin'
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Owned by the authentication collaborator; created here so a fresh
    // database carries the full schema.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            uid TEXT NOT NULL UNIQUE,
            username TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL,
            recovery_email TEXT,
            user_groups TEXT NOT NULL DEFAULT '',
            active INTEGER NOT NULL DEFAULT 1
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Non-unique by design: duplicate slugs are legal.
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_entries_slug ON entries(slug)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_archived_entries_slug ON archived_entries(slug)")
        .execute(pool)
        .await?;

    Ok(())
}
