//! Field-level dirty tracking
//!
//! Serialized with the same field names the portal client sends:
//! `sections`, `categories`, `documents` (names) and `statuses`.

use portal_checklist::CategoryKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Record of which leaves of a local checklist were modified since last sync
///
/// Only `true` flags count. A category flagged in `category_touched` is
/// structurally dirty: its active flag or the length/order of its document
/// list changed, so per-index flags for it no longer address stable
/// documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirtyMask {
    /// Section selection changed
    #[serde(rename = "sections", default)]
    pub sections_touched: bool,

    /// Structural change per category
    #[serde(rename = "categories", default)]
    pub category_touched: BTreeMap<CategoryKey, bool>,

    /// Document name edits per category and index
    #[serde(rename = "documents", default)]
    pub document_name_touched: BTreeMap<CategoryKey, BTreeMap<usize, bool>>,

    /// Document status edits per category and index
    #[serde(rename = "statuses", default)]
    pub document_status_touched: BTreeMap<CategoryKey, BTreeMap<usize, bool>>,
}

impl DirtyMask {
    /// Create clean mask
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flag the section selection
    #[inline]
    pub fn mark_sections(&mut self) {
        self.sections_touched = true;
    }

    /// Flag a structural change to a category
    #[inline]
    pub fn mark_category(&mut self, key: impl Into<CategoryKey>) {
        self.category_touched.insert(key.into(), true);
    }

    /// Flag a document name edit
    #[inline]
    pub fn mark_document_name(&mut self, key: impl Into<CategoryKey>, index: usize) {
        self.document_name_touched
            .entry(key.into())
            .or_default()
            .insert(index, true);
    }

    /// Flag a document status edit
    #[inline]
    pub fn mark_document_status(&mut self, key: impl Into<CategoryKey>, index: usize) {
        self.document_status_touched
            .entry(key.into())
            .or_default()
            .insert(index, true);
    }

    /// Check for a structural flag
    #[must_use]
    pub fn is_category_touched(&self, key: &str) -> bool {
        self.category_touched.get(key).copied().unwrap_or(false)
    }

    /// Check for a name flag at `(key, index)`
    #[must_use]
    pub fn is_name_touched(&self, key: &str, index: usize) -> bool {
        flag_at(&self.document_name_touched, key, index)
    }

    /// Check for a status flag at `(key, index)`
    #[must_use]
    pub fn is_status_touched(&self, key: &str, index: usize) -> bool {
        flag_at(&self.document_status_touched, key, index)
    }

    /// Check for any per-document flag in a category
    #[must_use]
    pub fn has_field_dirt(&self, key: &str) -> bool {
        any_flag(&self.document_name_touched, key) || any_flag(&self.document_status_touched, key)
    }

    /// Check if nothing is flagged
    #[must_use]
    pub fn is_clean(&self) -> bool {
        !self.sections_touched
            && !self.category_touched.values().any(|&flag| flag)
            && self.touched_categories().is_empty()
    }

    /// Categories with any flag, structural or per-document
    #[must_use]
    pub fn touched_categories(&self) -> BTreeSet<&CategoryKey> {
        let structural = self
            .category_touched
            .iter()
            .filter(|(_, &flag)| flag)
            .map(|(key, _)| key);
        let per_field = self
            .document_name_touched
            .iter()
            .chain(&self.document_status_touched)
            .filter(|(_, flags)| flags.values().any(|&flag| flag))
            .map(|(key, _)| key);

        structural.chain(per_field).collect()
    }

    /// Reset every flag
    #[inline]
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

fn flag_at(flags: &BTreeMap<CategoryKey, BTreeMap<usize, bool>>, key: &str, index: usize) -> bool {
    flags
        .get(key)
        .and_then(|by_index| by_index.get(&index))
        .copied()
        .unwrap_or(false)
}

fn any_flag(flags: &BTreeMap<CategoryKey, BTreeMap<usize, bool>>, key: &str) -> bool {
    flags
        .get(key)
        .is_some_and(|by_index| by_index.values().any(|&flag| flag))
}
