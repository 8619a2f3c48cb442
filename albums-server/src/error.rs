//! Error types for the store layer
//!
//! Acquisition and access are separate enums so the HTTP layer can map
//! them to different statuses (503 vs 500).

use thiserror::Error;

/// No live handle could be obtained from the store.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("store unavailable: {0}")]
    Unavailable(#[source] sqlx::Error),

    #[error("circuit open, retry in {remaining_ms}ms")]
    CircuitOpen { remaining_ms: u64 },
}

/// Failure while listing albums on a live handle.
///
/// Any variant aborts the whole listing; no partial results are returned.
#[derive(Debug, Error)]
pub enum AccessError {
    /// The query failed before the first row arrived.
    ///
    /// The store streams rows as it produces them, so an error raised after
    /// the server began executing, but before any row reached us, still
    /// lands here rather than in [`AccessError::Cursor`].
    #[error("query failed: {0}")]
    Query(#[source] sqlx::Error),

    /// A row did not match the four-column album shape.
    #[error("decode failed at row {row}: {source}")]
    Decode {
        row: usize,
        #[source]
        source: sqlx::Error,
    },

    /// The store reported an error after rows had been read.
    #[error("cursor failed after {rows_read} rows: {source}")]
    Cursor {
        rows_read: usize,
        #[source]
        source: sqlx::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_position() {
        let err = AccessError::Cursor {
            rows_read: 3,
            source: sqlx::Error::Protocol("connection reset".into()),
        };
        let msg = err.to_string();
        assert!(msg.contains("after 3 rows"));
        assert!(msg.contains("connection reset"));

        let err = AccessError::Decode {
            row: 0,
            source: sqlx::Error::ColumnIndexOutOfBounds { index: 3, len: 2 },
        };
        assert!(err.to_string().starts_with("decode failed at row 0"));
    }
}
