//! Error types for the sync layer
//!
//! Merging itself never fails; everything here comes from the checklist
//! store, the target addressing of admin/editor operations, or the transport
//! used by the auto-saver.

use portal_checklist::ChecklistError;

/// Checklist store errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Backing store could not be reached or refused the operation
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Checklist could not be encoded for storage
    #[error("encoding failed: {0}")]
    Encoding(#[from] ChecklistError),
}

/// Sync service errors
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// Read or write of the stored checklist failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Operation addressed a category or document that does not exist
    #[error("checklist error: {0}")]
    Checklist(#[from] ChecklistError),

    /// Submission did not reach the service
    #[error("transport error: {0}")]
    Transport(String),

    /// Auto-saver task has stopped
    #[error("auto-saver stopped")]
    Stopped,
}

impl SyncError {
    /// Check if error is retryable
    ///
    /// Retryable failures keep the caller's dirty mask intact, so the same
    /// submission can simply be sent again.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Store(StoreError::Unavailable(_)) | Self::Transport(_)
        )
    }

    /// Check if error reports a missing category or document
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Checklist(e) if e.is_not_found())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_checklist::CategoryKey;

    #[test]
    fn store_outage_is_retryable() {
        let err = SyncError::from(StoreError::Unavailable("connection reset".into()));
        assert!(err.is_retryable());
        assert!(!err.is_not_found());
        assert_eq!(
            err.to_string(),
            "store error: store unavailable: connection reset"
        );
    }

    #[test]
    fn missing_target_is_not_retryable() {
        let err = SyncError::from(ChecklistError::CategoryNotFound(CategoryKey::new("w_2s")));
        assert!(!err.is_retryable());
        assert!(err.is_not_found());
    }

    #[test]
    fn transport_failure_is_retryable() {
        assert!(SyncError::Transport("timeout".into()).is_retryable());
        assert!(!SyncError::Stopped.is_retryable());
    }
}
