//! Checklist data model
//!
//! Document identity inside a category is positional: a document is addressed
//! by its index in [`Category::documents`]. Inserting or removing a document
//! shifts every later index.

use crate::error::ChecklistError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Category identifier (e.g. `w_2s`, `p_l`)
///
/// Keys outside the standard vocabulary are legal and carried opaquely.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(String);

impl CategoryKey {
    /// Create new key
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Key as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for CategoryKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for CategoryKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Top-level checklist grouping (`personal`, `entity`)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    /// Section every project implicitly has
    pub const PERSONAL: &'static str = "personal";

    /// Business-entity section
    pub const ENTITY: &'static str = "entity";

    /// Create new section id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The implicit default section
    #[inline]
    #[must_use]
    pub fn personal() -> Self {
        Self::new(Self::PERSONAL)
    }

    /// The entity section
    #[inline]
    #[must_use]
    pub fn entity() -> Self {
        Self::new(Self::ENTITY)
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Review lifecycle of a single requested document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Nothing uploaded yet
    #[default]
    NotSubmitted,
    /// Uploaded, waiting for staff review
    PendingReview,
    /// Rejected, client must upload again
    NeedsResubmission,
    /// Upload incomplete
    MissingFiles,
    /// Reviewed and accepted
    Accepted,
}

impl DocumentStatus {
    /// All states in lifecycle order
    pub const ALL: [DocumentStatus; 5] = [
        Self::NotSubmitted,
        Self::PendingReview,
        Self::NeedsResubmission,
        Self::MissingFiles,
        Self::Accepted,
    ];

    /// Stored string form
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotSubmitted => "not_submitted",
            Self::PendingReview => "pending_review",
            Self::NeedsResubmission => "needs_resubmission",
            Self::MissingFiles => "missing_files",
            Self::Accepted => "accepted",
        }
    }
}

impl FromStr for DocumentStatus {
    type Err = ChecklistError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ChecklistError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One requested document slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentEntry {
    /// Free-text label, editable by client and staff
    pub name: String,
    /// Review state
    pub status: DocumentStatus,
}

impl DocumentEntry {
    /// Create entry in the `not_submitted` state
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DocumentStatus::NotSubmitted,
        }
    }

    /// With status
    #[inline]
    #[must_use]
    pub fn with_status(mut self, status: DocumentStatus) -> Self {
        self.status = status;
        self
    }
}

/// One checklist grouping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Display name
    pub label: String,
    /// Whether the category applies to this project
    pub active: bool,
    /// Requested documents; position is identity
    pub documents: Vec<DocumentEntry>,
    /// Unrecognized stored fields, kept verbatim
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Category {
    /// Create inactive category without documents
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            active: false,
            documents: Vec::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Stand-in for a category missing from a snapshot
    ///
    /// Equivalent to [`Category::new`]; named for merge call sites.
    #[inline]
    #[must_use]
    pub fn absent(label: impl Into<String>) -> Self {
        Self::new(label)
    }

    /// With active flag
    #[inline]
    #[must_use]
    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// With documents
    #[inline]
    #[must_use]
    pub fn with_documents(mut self, documents: Vec<DocumentEntry>) -> Self {
        self.documents = documents;
        self
    }

    /// Document at position
    #[inline]
    #[must_use]
    pub fn document(&self, index: usize) -> Option<&DocumentEntry> {
        self.documents.get(index)
    }
}

/// The `_meta` entry of a stored checklist
///
/// Fields other than `selectedSections` are kept verbatim in `extra`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SectionsMeta {
    /// Sections in scope, ordered, without duplicates
    pub selected_sections: Vec<SectionId>,
    /// Unrecognized `_meta` fields
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SectionsMeta {
    /// Create meta with given sections (duplicates dropped)
    #[must_use]
    pub fn with_sections(sections: impl IntoIterator<Item = SectionId>) -> Self {
        let mut meta = Self::default();
        for section in sections {
            if !meta.selected_sections.contains(&section) {
                meta.selected_sections.push(section);
            }
        }
        meta
    }
}

/// Per-project document checklist
#[derive(Debug, Clone, PartialEq)]
pub struct Checklist {
    /// Section selection and other `_meta` data
    pub meta: SectionsMeta,
    /// Categories in stored order
    pub categories: IndexMap<CategoryKey, Category>,
    /// Top-level entries that are neither `_meta` nor categories
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for Checklist {
    /// The checklist of a project that has never been written
    fn default() -> Self {
        Self::with_sections([SectionId::personal()])
    }
}

impl Checklist {
    /// Create checklist with no categories
    #[must_use]
    pub fn with_sections(sections: impl IntoIterator<Item = SectionId>) -> Self {
        Self {
            meta: SectionsMeta::with_sections(sections),
            categories: IndexMap::new(),
            extra: serde_json::Map::new(),
        }
    }

    /// Stored section selection
    #[inline]
    #[must_use]
    pub fn sections(&self) -> &[SectionId] {
        &self.meta.selected_sections
    }

    /// Section selection with the implicit `personal` default applied
    #[must_use]
    pub fn effective_sections(&self) -> Vec<SectionId> {
        if self.meta.selected_sections.is_empty() {
            vec![SectionId::personal()]
        } else {
            self.meta.selected_sections.clone()
        }
    }

    /// Add the section if missing, remove it if present
    ///
    /// Returns whether the section is selected afterwards.
    pub fn toggle_section(&mut self, section: &SectionId) -> bool {
        let sections = &mut self.meta.selected_sections;
        if let Some(pos) = sections.iter().position(|s| s == section) {
            sections.remove(pos);
            false
        } else {
            sections.push(section.clone());
            true
        }
    }

    /// Category by key
    #[inline]
    #[must_use]
    pub fn category(&self, key: &str) -> Option<&Category> {
        self.categories.get(key)
    }

    /// Mutable category by key
    #[inline]
    pub fn category_mut(&mut self, key: &str) -> Option<&mut Category> {
        self.categories.get_mut(key)
    }

    /// Category by key, or a not-found error
    pub fn require_category_mut(&mut self, key: &str) -> Result<&mut Category, ChecklistError> {
        self.categories
            .get_mut(key)
            .ok_or_else(|| ChecklistError::CategoryNotFound(CategoryKey::new(key)))
    }

    /// Insert or replace a category, keeping its position if it existed
    pub fn insert_category(&mut self, key: impl Into<CategoryKey>, category: Category) {
        self.categories.insert(key.into(), category);
    }

    /// Document at `(key, index)`
    pub fn document(&self, key: &str, index: usize) -> Result<&DocumentEntry, ChecklistError> {
        let category = self
            .categories
            .get(key)
            .ok_or_else(|| ChecklistError::CategoryNotFound(CategoryKey::new(key)))?;
        category
            .documents
            .get(index)
            .ok_or_else(|| ChecklistError::out_of_range(key, index, category.documents.len()))
    }

    /// Mutable document at `(key, index)`
    pub fn document_mut(
        &mut self,
        key: &str,
        index: usize,
    ) -> Result<&mut DocumentEntry, ChecklistError> {
        let category = self.require_category_mut(key)?;
        let len = category.documents.len();
        category
            .documents
            .get_mut(index)
            .ok_or_else(|| ChecklistError::out_of_range(key, index, len))
    }

    /// Iterate documents across all categories
    pub fn documents(&self) -> impl Iterator<Item = (&CategoryKey, usize, &DocumentEntry)> {
        self.categories.iter().flat_map(|(key, category)| {
            category
                .documents
                .iter()
                .enumerate()
                .map(move |(index, doc)| (key, index, doc))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn w2_checklist() -> Checklist {
        let mut checklist = Checklist::default();
        checklist.insert_category(
            "w_2s",
            Category::new("W-2s")
                .with_active(true)
                .with_documents(vec![DocumentEntry::new("W2")]),
        );
        checklist
    }

    #[test]
    fn default_checklist_selects_personal() {
        let checklist = Checklist::default();
        assert_eq!(checklist.sections(), &[SectionId::personal()]);
        assert!(checklist.categories.is_empty());
    }

    #[test]
    fn effective_sections_fall_back_to_personal() {
        let checklist = Checklist::with_sections([]);
        assert!(checklist.sections().is_empty());
        assert_eq!(checklist.effective_sections(), vec![SectionId::personal()]);
    }

    #[test]
    fn sections_are_deduplicated() {
        let checklist = Checklist::with_sections([
            SectionId::personal(),
            SectionId::entity(),
            SectionId::personal(),
        ]);
        assert_eq!(checklist.sections().len(), 2);
    }

    #[test]
    fn toggle_section_adds_and_removes() {
        let mut checklist = Checklist::default();
        assert!(checklist.toggle_section(&SectionId::entity()));
        assert_eq!(
            checklist.sections(),
            &[SectionId::personal(), SectionId::entity()]
        );
        assert!(!checklist.toggle_section(&SectionId::personal()));
        assert_eq!(checklist.sections(), &[SectionId::entity()]);
    }

    #[test]
    fn document_lookup_errors() {
        let mut checklist = w2_checklist();

        assert!(checklist.document("w_2s", 0).is_ok());
        assert!(matches!(
            checklist.document("1099s", 0),
            Err(ChecklistError::CategoryNotFound(_))
        ));
        assert!(matches!(
            checklist.document_mut("w_2s", 1),
            Err(ChecklistError::DocumentOutOfRange { index: 1, len: 1, .. })
        ));
    }

    #[test]
    fn status_parse() {
        assert_eq!(
            "pending_review".parse::<DocumentStatus>().unwrap(),
            DocumentStatus::PendingReview
        );
        assert!("approved".parse::<DocumentStatus>().is_err());
        assert_eq!(DocumentStatus::default(), DocumentStatus::NotSubmitted);
    }

    #[test]
    fn documents_iterates_in_position_order() {
        let mut checklist = w2_checklist();
        checklist
            .category_mut("w_2s")
            .unwrap()
            .documents
            .push(DocumentEntry::new("W2 - second job"));

        let names: Vec<_> = checklist
            .documents()
            .map(|(_, index, doc)| (index, doc.name.as_str()))
            .collect();
        assert_eq!(names, vec![(0, "W2"), (1, "W2 - second job")]);
    }

    #[test]
    fn category_key_borrows_as_str() {
        let checklist = w2_checklist();
        let key = CategoryKey::new("w_2s");
        assert!(checklist.categories.contains_key(key.as_str()));
        assert_eq!(key.to_string(), "w_2s");
    }
}
