//! Merge strategies
//!
//! Provides the [`MergeStrategy`] trait and the two strategies the portal
//! uses: field-level reconciliation for client saves and wholesale overwrite
//! for admin saves.

use crate::dirty::DirtyMask;
use portal_checklist::{Category, CategoryKey, Checklist, DocumentEntry, SectionsMeta};
use std::fmt::Debug;

/// Reconciliation of a local checklist against the stored one
///
/// # Invariants
/// Implementations are pure and total: the same inputs always give the same
/// checklist, and no input makes them fail.
pub trait MergeStrategy: Send + Sync + Debug {
    /// Produce the checklist to persist
    fn merge(&self, authoritative: &Checklist, local: &Checklist, dirty: &DirtyMask) -> Checklist;

    /// Strategy name (for logs and audit records)
    fn name(&self) -> &'static str;
}

/// Field-level merge driven by a [`DirtyMask`]
///
/// # Rules
/// - Sections: local when flagged, stored otherwise
/// - Result keys: stored keys, then local-only keys; nothing is pruned
/// - Structurally dirty category: local label, active flag, names and shape;
///   each status is local if flagged at that index, else the stored status at
///   the same index, else local
/// - Per-field dirty category: stored label and active flag; documents follow
///   local positions, taking local name/status where flagged and stored
///   values otherwise
/// - Clean category: stored verbatim (absent stored categories become an
///   inactive, empty category with the local label)
/// - Unrecognized fields and entries: stored first, local-only ones added
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldLevelMerge;

impl FieldLevelMerge {
    /// Create new field-level strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn merge_meta(authoritative: &SectionsMeta, local: &SectionsMeta) -> SectionsMeta {
        let mut extra = authoritative.extra.clone();
        extra.extend(local.extra.iter().map(|(k, v)| (k.clone(), v.clone())));
        SectionsMeta {
            selected_sections: local.selected_sections.clone(),
            extra,
        }
    }

    /// Trust local shape, keep stored statuses the local actor did not touch
    fn merge_structural(
        key: &CategoryKey,
        stored: Option<&Category>,
        local: &Category,
        dirty: &DirtyMask,
    ) -> Category {
        let documents = local
            .documents
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                let status = if dirty.is_status_touched(key.as_str(), index) {
                    doc.status
                } else {
                    stored
                        .and_then(|c| c.document(index))
                        .map_or(doc.status, |d| d.status)
                };
                DocumentEntry {
                    name: doc.name.clone(),
                    status,
                }
            })
            .collect();

        Category {
            label: local.label.clone(),
            active: local.active,
            documents,
            extra: overlay_missing(
                stored.map(|c| &c.extra).unwrap_or(&local.extra),
                &local.extra,
            ),
        }
    }

    /// Stored category as baseline, local values only where flagged
    fn merge_fields(
        key: &CategoryKey,
        stored: Option<&Category>,
        local: &Category,
        dirty: &DirtyMask,
    ) -> Category {
        let base = stored
            .cloned()
            .unwrap_or_else(|| Category::absent(local.label.clone()));

        let documents = local
            .documents
            .iter()
            .enumerate()
            .map(|(index, doc)| {
                let stored_doc = base.document(index);

                let name = if dirty.is_name_touched(key.as_str(), index) {
                    doc.name.clone()
                } else {
                    // a blank stored name never wins over a local one
                    stored_doc
                        .map(|d| d.name.as_str())
                        .filter(|name| !name.is_empty())
                        .unwrap_or(&doc.name)
                        .to_string()
                };

                let status = if dirty.is_status_touched(key.as_str(), index) {
                    doc.status
                } else {
                    stored_doc.map_or(doc.status, |d| d.status)
                };

                DocumentEntry { name, status }
            })
            .collect();

        Category { documents, ..base }
    }
}

impl MergeStrategy for FieldLevelMerge {
    fn merge(&self, authoritative: &Checklist, local: &Checklist, dirty: &DirtyMask) -> Checklist {
        let meta = if dirty.sections_touched {
            Self::merge_meta(&authoritative.meta, &local.meta)
        } else {
            authoritative.meta.clone()
        };

        // stored categories first, in stored order
        let mut categories = authoritative.categories.clone();

        for (key, local_category) in &local.categories {
            let stored = authoritative.categories.get(key);

            let merged = if dirty.is_category_touched(key.as_str()) {
                tracing::debug!(category = %key, branch = "structural", "merging category");
                Self::merge_structural(key, stored, local_category, dirty)
            } else if dirty.has_field_dirt(key.as_str()) {
                tracing::debug!(category = %key, branch = "field", "merging category");
                Self::merge_fields(key, stored, local_category, dirty)
            } else if let Some(stored) = stored {
                stored.clone()
            } else {
                Category::absent(local_category.label.clone())
            };

            categories.insert(key.clone(), merged);
        }

        let extra = overlay_missing(&authoritative.extra, &local.extra);

        Checklist {
            meta,
            categories,
            extra,
        }
    }

    fn name(&self) -> &'static str {
        "FieldLevel"
    }
}

/// Local snapshot replaces the stored one
///
/// Used for admin saves, where staff edit the whole checklist at once and
/// their copy is authoritative by definition.
#[derive(Debug, Clone, Copy, Default)]
pub struct OverwriteMerge;

impl OverwriteMerge {
    /// Create new overwrite strategy
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl MergeStrategy for OverwriteMerge {
    fn merge(
        &self,
        _authoritative: &Checklist,
        local: &Checklist,
        _dirty: &DirtyMask,
    ) -> Checklist {
        local.clone()
    }

    fn name(&self) -> &'static str {
        "Overwrite"
    }
}

/// `base` plus the entries of `other` whose keys it lacks
fn overlay_missing(
    base: &serde_json::Map<String, serde_json::Value>,
    other: &serde_json::Map<String, serde_json::Value>,
) -> serde_json::Map<String, serde_json::Value> {
    let mut merged = base.clone();
    for (key, value) in other {
        if !merged.contains_key(key) {
            merged.insert(key.clone(), value.clone());
        }
    }
    merged
}

/// Field-level merge of `local` into `authoritative`
///
/// Shorthand for [`FieldLevelMerge`].
#[must_use]
pub fn merge(authoritative: &Checklist, local: &Checklist, dirty: &DirtyMask) -> Checklist {
    FieldLevelMerge.merge(authoritative, local, dirty)
}
