//! Error taxonomy for the refresh engine.
//!
//! "Already refreshed today" is deliberately absent: the daily guard is a
//! successful zero-count outcome, not an error, so callers can poll the
//! refresh surface cheaply (see `automation::engine`).

use thiserror::Error;

use crate::db::DbError;

/// Errors surfaced by a refresh invocation.
///
/// Any error raised inside the refresh transaction rolls the whole
/// transaction back: no partial signals, and `last_refreshed_at` is not
/// advanced, so the next invocation retries the full day.
#[derive(Debug, Error)]
pub enum AutomationError {
    /// No resolvable caller identity; nothing was attempted.
    #[error("no authenticated studio owner (set ownerId in ~/.studioops/config.json or STUDIOOPS_OWNER)")]
    Unauthenticated,

    /// A read or write against the store failed.
    #[error("data source failure: {0}")]
    Data(#[from] DbError),

    /// A signal upsert hit a uniqueness conflict its natural key should have
    /// absorbed. This means the key derivation is wrong somewhere, so it is
    /// surfaced instead of swallowed.
    #[error("constraint violation upserting {rule_key} signal for client {client_id}: {source}")]
    ConstraintViolation {
        rule_key: String,
        client_id: String,
        #[source]
        source: rusqlite::Error,
    },
}

impl AutomationError {
    /// True for failures worth retrying later (store unavailable, lock
    /// contention that outlived the busy timeout). Identity and key-derivation
    /// errors will not succeed on retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AutomationError::Data(_))
    }
}
