//! Portal Checklist Model
//!
//! Typed per-project document checklists, as mirrored into the CRM's
//! `document_data` property.
//!
//! # Core Concepts
//!
//! - [`Checklist`]: Root document (selected sections + categories)
//! - [`Category`]: One grouping of requested documents, e.g. "W-2s"
//! - [`DocumentEntry`]: One named, status-tracked document slot
//! - [`Entry`]: Structural classification of a stored top-level entry
//! - [`Vocabulary`]: Known category keys, labels and section membership
//! - [`StageMap`]: CRM pipeline stage ids normalized to [`TaxStage`]
//!
//! # Example
//!
//! ```rust
//! use portal_checklist::{Checklist, DocumentStatus};
//!
//! let stored = r#"{"_meta":{"selectedSections":["personal"]},
//!     "w_2s":{"label":"W-2s","status":"active",
//!             "documents":[{"name":"W2","status":"pending_review"}]}}"#;
//!
//! let checklist = Checklist::from_json_str(stored).unwrap();
//! let doc = checklist.document("w_2s", 0).unwrap();
//! assert_eq!(doc.status, DocumentStatus::PendingReview);
//! ```

#![warn(unreachable_pub)]

mod codec;
mod error;
mod model;
mod stage;
mod stats;
mod vocabulary;

pub use codec::{Entry, META_KEY};
pub use error::ChecklistError;
pub use model::{
    Category, CategoryKey, Checklist, DocumentEntry, DocumentStatus, SectionId, SectionsMeta,
};
pub use stage::{StageMap, TaxStage};
pub use stats::ChecklistStats;
pub use vocabulary::{CategoryDefinition, LayoutEntry, SectionLayout, Vocabulary};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;

    #[test]
    fn stored_round_trip_keeps_unknown_categories() {
        let stored = r#"{
            "_meta": {"selectedSections": ["personal", "entity"]},
            "w_2s": {"label": "W-2s", "status": "active", "documents": []},
            "crypto_statements": {"label": "Crypto", "status": "inactive", "documents": [
                {"name": "Exchange export", "status": "missing_files"}
            ]}
        }"#;

        let checklist = Checklist::from_json_str(stored).unwrap();
        let encoded = checklist.to_json_string().unwrap();
        let decoded = Checklist::from_json_str(&encoded).unwrap();

        assert_eq!(checklist, decoded);
        assert!(decoded.category("crypto_statements").is_some());
    }

    #[test]
    fn vocabulary_stats_and_stages_work_together() {
        let vocabulary = Vocabulary::standard();
        let mut checklist = Checklist::default();
        let label = vocabulary.label_for("w_2s").unwrap().to_string();

        let mut category = Category::new(label);
        category.active = true;
        category.documents.push(DocumentEntry::new("W2 - Employer"));
        checklist.insert_category("w_2s", category);

        assert_eq!(ChecklistStats::of(&checklist).total, 1);
        assert_eq!(StageMap::standard().normalize("1742632657"), TaxStage::Accepted);
    }
}
