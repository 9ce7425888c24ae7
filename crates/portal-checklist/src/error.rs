//! Error types for the checklist model

use crate::model::CategoryKey;

/// Checklist decoding and lookup errors
#[derive(Debug, thiserror::Error)]
pub enum ChecklistError {
    /// Stored document data is not valid JSON
    #[error("invalid checklist json: {0}")]
    Json(#[from] serde_json::Error),

    /// Category key not present in the checklist
    #[error("category not found: {0}")]
    CategoryNotFound(CategoryKey),

    /// Category key unknown to both the checklist and the vocabulary
    #[error("unknown category: {0}")]
    UnknownCategory(CategoryKey),

    /// Document index past the end of the category's document list
    #[error("document {index} out of range for category {category} (len {len})")]
    DocumentOutOfRange {
        /// Category addressed
        category: CategoryKey,
        /// Requested position
        index: usize,
        /// Current document count
        len: usize,
    },

    /// Status string outside the known lifecycle states
    #[error("invalid document status: '{0}'")]
    InvalidStatus(String),
}

impl ChecklistError {
    /// Create out-of-range error
    #[inline]
    #[must_use]
    pub fn out_of_range(category: impl Into<CategoryKey>, index: usize, len: usize) -> Self {
        Self::DocumentOutOfRange {
            category: category.into(),
            index,
            len,
        }
    }

    /// Check if the error means "no such document or category"
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CategoryNotFound(_) | Self::UnknownCategory(_) | Self::DocumentOutOfRange { .. }
        )
    }
}
