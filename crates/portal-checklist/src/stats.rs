//! Checklist progress statistics for the admin dashboard

use crate::model::{Checklist, DocumentStatus};
use serde::Serialize;

/// Document counts by review state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistStats {
    /// All requested documents, active or not
    pub total: usize,
    /// `not_submitted`
    pub not_submitted: usize,
    /// `pending_review`
    pub pending_review: usize,
    /// `needs_resubmission`
    pub needs_resubmission: usize,
    /// `missing_files`
    pub missing_files: usize,
    /// `accepted`
    pub accepted: usize,
    /// Categories flagged active
    pub active_categories: usize,
}

impl ChecklistStats {
    /// Count a checklist
    #[must_use]
    pub fn of(checklist: &Checklist) -> Self {
        let mut stats = Self {
            active_categories: checklist.categories.values().filter(|c| c.active).count(),
            ..Self::default()
        };

        for (_, _, doc) in checklist.documents() {
            stats.total += 1;
            match doc.status {
                DocumentStatus::NotSubmitted => stats.not_submitted += 1,
                DocumentStatus::PendingReview => stats.pending_review += 1,
                DocumentStatus::NeedsResubmission => stats.needs_resubmission += 1,
                DocumentStatus::MissingFiles => stats.missing_files += 1,
                DocumentStatus::Accepted => stats.accepted += 1,
            }
        }

        stats
    }

    /// Documents not yet accepted
    #[inline]
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.total - self.accepted
    }

    /// Share of documents accepted, 0.0 when nothing is requested
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn completion(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.accepted as f64 / self.total as f64
        }
    }
}
