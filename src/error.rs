//! Error types for the wiki core.
//!
//! Every library operation returns [`WikiResult`]. The variants map
//! one-to-one onto the responses the excluded request layer renders:
//! validation and not-found reject the request, forbidden denies it,
//! storage failures roll back and surface as a generic failure. A
//! degraded content mirror is deliberately *not* an error — see
//! [`SyncStatus`](crate::service::SyncStatus).

use thiserror::Error;

/// Result type alias for wiki core operations.
pub type WikiResult<T> = Result<T, WikiError>;

/// Errors surfaced by the storage and access-control core.
#[derive(Debug, Error)]
pub enum WikiError {
    /// Title rejected before any write happened (empty, or normalizes
    /// to an unusable slug).
    #[error("invalid title: {0}")]
    Validation(String),

    /// No live entry matches the slug.
    #[error("no entry matches slug '{0}'")]
    NotFound(String),

    /// More than one live entry matches the slug and the operation
    /// needs exactly one. Picking an arbitrary match would leak or
    /// hide content, so the caller must disambiguate instead.
    #[error("slug '{0}' matches more than one entry")]
    Ambiguous(String),

    /// The caller's group set does not grant access to the entry it
    /// tried to mutate.
    #[error("access denied for slug '{0}'")]
    Forbidden(String),

    /// Relational engine failure; the enclosing transaction was rolled
    /// back and nothing was applied.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),

    /// Content-mirror failure on a read path (history). Mutation paths
    /// report mirror trouble as a degraded status instead; filesystem
    /// errors inside the content root arrive wrapped in here too.
    #[error(transparent)]
    Mirror(#[from] anyhow::Error),
}

impl WikiError {
    /// Create a Validation error with context.
    pub fn validation<S: Into<String>>(msg: S) -> Self {
        WikiError::Validation(msg.into())
    }

    /// Create a NotFound error for the given slug.
    pub fn not_found<S: Into<String>>(slug: S) -> Self {
        WikiError::NotFound(slug.into())
    }

    /// Check if this is a NotFound error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, WikiError::NotFound(_))
    }

    /// Check if this is a Forbidden error.
    pub fn is_forbidden(&self) -> bool {
        matches!(self, WikiError::Forbidden(_))
    }

    /// Check if this is an Ambiguous error.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, WikiError::Ambiguous(_))
    }
}
