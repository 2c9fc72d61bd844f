//! Core data models for the wiki storage subsystem.
//!
//! An [`Entry`] is the authoritative, relational form of a wiki page.
//! The git working tree under the content root holds a derived copy of
//! each entry's text, one file per slug; SQLite remains the system of
//! record.

use std::collections::BTreeSet;

use serde::Serialize;

/// A live wiki entry as stored in the `entries` table.
///
/// `uid` is assigned once at creation and never reused or recomputed.
/// `slug` is derived from `title` exactly once, also at creation; both
/// are immutable afterwards. Two live entries may share a slug — the
/// access filter decides how duplicates surface to a caller.
///
/// Invariant: `allowed_groups` always contains the privileged group,
/// whether or not the creator asked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entry {
    pub uid: String,
    pub title: String,
    pub slug: String,
    pub text: String,
    pub allowed_groups: BTreeSet<String>,
}

/// One commit touching a slug's file in the content root.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    /// Abbreviated commit id.
    pub commit: String,
    /// Commit timestamp as unix seconds.
    pub timestamp: i64,
    pub author: String,
    pub message: String,
}

/// Parse a comma-separated group list into a set.
///
/// Whitespace around names is dropped, as are empty segments, so
/// `"eng, ops,"` and `"ops,eng"` parse to the same set. An empty input
/// parses to the empty set, which reads as "anonymous".
pub fn parse_groups(raw: &str) -> BTreeSet<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join a group set back into its stored comma-separated form.
pub fn join_groups(groups: &BTreeSet<String>) -> String {
    groups.iter().cloned().collect::<Vec<_>>().join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trims_and_drops_empties() {
        let groups = parse_groups(" eng, ops,,admin ");
        assert_eq!(join_groups(&groups), "admin,eng,ops");
    }

    #[test]
    fn parse_empty_is_anonymous() {
        assert!(parse_groups("").is_empty());
        assert!(parse_groups(" , ").is_empty());
    }

    #[test]
    fn round_trip_is_sorted_and_unique() {
        let groups = parse_groups("ops,eng,ops");
        assert_eq!(join_groups(&groups), "eng,ops");
    }
}
