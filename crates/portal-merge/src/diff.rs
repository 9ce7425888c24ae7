//! Change lists between two checklist snapshots
//!
//! Used for audit records: what a save actually changed in the stored data.

use portal_checklist::{CategoryKey, Checklist, DocumentStatus, SectionId};
use serde::Serialize;
use std::fmt::{self, Write as _};

/// Number of changes spelled out by [`ChecklistDiff::summary`]
const SUMMARY_LIMIT: usize = 5;

/// One difference between two snapshots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Change {
    /// Section selection changed
    SectionsChanged {
        /// Sections before
        from: Vec<SectionId>,
        /// Sections after
        to: Vec<SectionId>,
    },
    /// Category present only in the new snapshot
    CategoryAdded {
        /// Category key
        category: CategoryKey,
    },
    /// Category present only in the old snapshot
    CategoryRemoved {
        /// Category key
        category: CategoryKey,
    },
    /// Active flag flipped
    CategoryToggled {
        /// Category key
        category: CategoryKey,
        /// New active flag
        active: bool,
    },
    /// Display label changed
    LabelChanged {
        /// Category key
        category: CategoryKey,
        /// Old label
        from: String,
        /// New label
        to: String,
    },
    /// Document slot appended
    DocumentAdded {
        /// Category key
        category: CategoryKey,
        /// Position
        index: usize,
        /// Document name
        name: String,
    },
    /// Document slot dropped from the tail
    DocumentRemoved {
        /// Category key
        category: CategoryKey,
        /// Position
        index: usize,
        /// Document name
        name: String,
    },
    /// Document renamed
    DocumentRenamed {
        /// Category key
        category: CategoryKey,
        /// Position
        index: usize,
        /// Old name
        from: String,
        /// New name
        to: String,
    },
    /// Review state changed
    StatusChanged {
        /// Category key
        category: CategoryKey,
        /// Position
        index: usize,
        /// Old status
        from: DocumentStatus,
        /// New status
        to: DocumentStatus,
    },
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SectionsChanged { to, .. } => {
                let sections: Vec<_> = to.iter().map(SectionId::as_str).collect();
                write!(f, "sections -> [{}]", sections.join(", "))
            }
            Self::CategoryAdded { category } => write!(f, "+{category}"),
            Self::CategoryRemoved { category } => write!(f, "-{category}"),
            Self::CategoryToggled { category, active } => {
                let state = if *active { "active" } else { "inactive" };
                write!(f, "{category} {state}")
            }
            Self::LabelChanged { category, to, .. } => write!(f, "{category} label \"{to}\""),
            Self::DocumentAdded { category, index, name } => {
                write!(f, "+{category}[{index}] \"{name}\"")
            }
            Self::DocumentRemoved { category, index, name } => {
                write!(f, "-{category}[{index}] \"{name}\"")
            }
            Self::DocumentRenamed { category, index, to, .. } => {
                write!(f, "{category}[{index}] renamed \"{to}\"")
            }
            Self::StatusChanged { category, index, from, to } => {
                write!(f, "{category}[{index}] {from} -> {to}")
            }
        }
    }
}

/// Ordered list of [`Change`]s
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChecklistDiff {
    /// Changes in snapshot order
    pub changes: Vec<Change>,
}

impl ChecklistDiff {
    /// Compare two snapshots
    ///
    /// Documents are compared by position, so an insertion in the middle of a
    /// list shows up as renames plus an addition at the tail.
    #[must_use]
    pub fn between(before: &Checklist, after: &Checklist) -> Self {
        let mut changes = Vec::new();

        if before.sections() != after.sections() {
            changes.push(Change::SectionsChanged {
                from: before.sections().to_vec(),
                to: after.sections().to_vec(),
            });
        }

        for (key, old) in &before.categories {
            let Some(new) = after.categories.get(key) else {
                changes.push(Change::CategoryRemoved {
                    category: key.clone(),
                });
                continue;
            };

            if old.active != new.active {
                changes.push(Change::CategoryToggled {
                    category: key.clone(),
                    active: new.active,
                });
            }
            if old.label != new.label {
                changes.push(Change::LabelChanged {
                    category: key.clone(),
                    from: old.label.clone(),
                    to: new.label.clone(),
                });
            }

            let shared = old.documents.len().min(new.documents.len());
            for (index, (a, b)) in old.documents.iter().zip(&new.documents).enumerate() {
                if a.name != b.name {
                    changes.push(Change::DocumentRenamed {
                        category: key.clone(),
                        index,
                        from: a.name.clone(),
                        to: b.name.clone(),
                    });
                }
                if a.status != b.status {
                    changes.push(Change::StatusChanged {
                        category: key.clone(),
                        index,
                        from: a.status,
                        to: b.status,
                    });
                }
            }
            for (index, doc) in old.documents.iter().enumerate().skip(shared) {
                changes.push(Change::DocumentRemoved {
                    category: key.clone(),
                    index,
                    name: doc.name.clone(),
                });
            }
            for (index, doc) in new.documents.iter().enumerate().skip(shared) {
                changes.push(Change::DocumentAdded {
                    category: key.clone(),
                    index,
                    name: doc.name.clone(),
                });
            }
        }

        for key in after.categories.keys() {
            if !before.categories.contains_key(key) {
                changes.push(Change::CategoryAdded {
                    category: key.clone(),
                });
            }
        }

        Self { changes }
    }

    /// Check if the snapshots were equal
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Number of changes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// One-line description for log messages
    #[must_use]
    pub fn summary(&self) -> String {
        if self.changes.is_empty() {
            return "no changes".to_string();
        }

        let shown: Vec<String> = self
            .changes
            .iter()
            .take(SUMMARY_LIMIT)
            .map(ToString::to_string)
            .collect();
        let mut summary = shown.join("; ");
        if self.changes.len() > SUMMARY_LIMIT {
            let _ = write!(summary, " (+{} more)", self.changes.len() - SUMMARY_LIMIT);
        }
        summary
    }
}

impl fmt::Display for ChecklistDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
