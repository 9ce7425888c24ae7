//! Upload notifications

use portal_checklist::{CategoryKey, Checklist, ChecklistError, DocumentStatus};
use portal_merge::DirtyMask;
use serde::{Deserialize, Serialize};

/// A file was uploaded for the document at `(category, index)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadEvent {
    /// Category key
    pub category: CategoryKey,
    /// Document position
    pub index: usize,
}

impl UploadEvent {
    /// Create new event
    #[must_use]
    pub fn new(category: impl Into<CategoryKey>, index: usize) -> Self {
        Self {
            category: category.into(),
            index,
        }
    }

    /// Mark the document `pending_review` and flag its status
    ///
    /// # Errors
    /// Not-found errors when the target does not exist; nothing is changed.
    pub fn fold_into(
        &self,
        checklist: &mut Checklist,
        dirty: &mut DirtyMask,
    ) -> Result<(), ChecklistError> {
        checklist
            .document_mut(self.category.as_str(), self.index)?
            .status = DocumentStatus::PendingReview;
        dirty.mark_document_status(self.category.clone(), self.index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_test_utils::single_w2;

    #[test]
    fn fold_sets_pending_review() {
        let mut checklist = single_w2(DocumentStatus::NotSubmitted);
        let mut dirty = DirtyMask::new();

        UploadEvent::new("w_2s", 0).fold_into(&mut checklist, &mut dirty).unwrap();

        assert_eq!(
            checklist.document("w_2s", 0).unwrap().status,
            DocumentStatus::PendingReview
        );
        assert!(dirty.is_status_touched("w_2s", 0));
    }

    #[test]
    fn fold_on_missing_target_changes_nothing() {
        let mut checklist = single_w2(DocumentStatus::NotSubmitted);
        let mut dirty = DirtyMask::new();

        let err = UploadEvent::new("w_2s", 3)
            .fold_into(&mut checklist, &mut dirty)
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(dirty.is_clean());
        assert_eq!(checklist, single_w2(DocumentStatus::NotSubmitted));
    }
}
