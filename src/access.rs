//! Group-based visibility rules.
//!
//! Every read and mutation in the core takes the caller's group
//! memberships as an explicit parameter — never from ambient session
//! state — and the functions here decide what that group set may see.
//!
//! The policy is deny-by-default: an empty group set ("anonymous")
//! sees nothing. The privileged group sees every live entry, including
//! entries that share a slug, so an administrator can spot and
//! disambiguate slug collisions. Everyone else sees the union of their
//! group grants, deduplicated by slug.

use std::collections::BTreeSet;

use crate::models::Entry;

/// Group that may see and mutate every entry.
pub const PRIVILEGED_GROUP: &str = "admin";

/// True if the caller belongs to the privileged group.
pub fn is_privileged(caller_groups: &BTreeSet<String>) -> bool {
    caller_groups.contains(PRIVILEGED_GROUP)
}

/// True if the caller's group set grants access to `entry`.
///
/// Set-intersection based: any shared group suffices. The caller's
/// group ordering never matters.
pub fn can_access(caller_groups: &BTreeSet<String>, entry: &Entry) -> bool {
    is_privileged(caller_groups)
        || caller_groups
            .iter()
            .any(|g| entry.allowed_groups.contains(g))
}

/// Filter `entries` down to what `caller_groups` may see, preserving
/// input order.
///
/// - Empty group set: empty result.
/// - Privileged caller: every entry, no dedup.
/// - Otherwise: entries granted to any of the caller's groups,
///   deduplicated by slug keeping the first occurrence. Overlapping
///   group grants would otherwise surface the same slug more than once.
pub fn visible_entries(caller_groups: &BTreeSet<String>, entries: &[Entry]) -> Vec<Entry> {
    if caller_groups.is_empty() {
        return Vec::new();
    }
    if is_privileged(caller_groups) {
        return entries.to_vec();
    }

    let mut seen_slugs = BTreeSet::new();
    let mut visible = Vec::new();
    for entry in entries {
        if !can_access(caller_groups, entry) {
            continue;
        }
        if seen_slugs.insert(entry.slug.clone()) {
            visible.push(entry.clone());
        }
    }
    visible
}
