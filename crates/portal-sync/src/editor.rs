//! Local checklist editing with dirty tracking
//!
//! Every edit mutates the local checklist and flags what it touched:
//!
//! | Edit | Flag |
//! |---|---|
//! | toggle section | sections |
//! | toggle category, add/remove document | category (structural) |
//! | rename document | document name at index |
//! | set status, upload | document status at index |
//!
//! Structural edits never set per-index flags, and existing per-index flags
//! are left where they are when indices shift.

use crate::upload::UploadEvent;
use portal_checklist::{
    Category, CategoryKey, Checklist, ChecklistError, DocumentEntry, DocumentStatus, SectionId,
    Vocabulary,
};
use portal_merge::DirtyMask;

/// One user action on the local checklist
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    /// Select or deselect a section
    ToggleSection(SectionId),
    /// Flip a category's active flag
    ToggleCategory(CategoryKey),
    /// Append a `not_submitted` document
    AddDocument {
        /// Category key
        category: CategoryKey,
        /// Document name
        name: String,
    },
    /// Remove a document, shifting later ones down
    RemoveDocument {
        /// Category key
        category: CategoryKey,
        /// Document position
        index: usize,
    },
    /// Rename a document
    RenameDocument {
        /// Category key
        category: CategoryKey,
        /// Document position
        index: usize,
        /// New name
        name: String,
    },
    /// Change a document's review state
    SetStatus {
        /// Category key
        category: CategoryKey,
        /// Document position
        index: usize,
        /// New status
        status: DocumentStatus,
    },
    /// A file upload finished
    Upload(UploadEvent),
}

/// Local checklist copy plus the mask of what changed since the last sync
#[derive(Debug, Clone)]
pub struct ChecklistEditor {
    checklist: Checklist,
    dirty: DirtyMask,
    vocabulary: Vocabulary,
}

impl ChecklistEditor {
    /// Start editing a freshly loaded checklist
    #[must_use]
    pub fn new(checklist: Checklist, vocabulary: Vocabulary) -> Self {
        Self {
            checklist,
            dirty: DirtyMask::new(),
            vocabulary,
        }
    }

    /// Local checklist
    #[inline]
    #[must_use]
    pub fn checklist(&self) -> &Checklist {
        &self.checklist
    }

    /// Accumulated dirt
    #[inline]
    #[must_use]
    pub fn dirty(&self) -> &DirtyMask {
        &self.dirty
    }

    /// Check for unsynced edits
    #[inline]
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        !self.dirty.is_clean()
    }

    /// Copy of the payload for a merge request
    #[must_use]
    pub fn snapshot(&self) -> (Checklist, DirtyMask) {
        (self.checklist.clone(), self.dirty.clone())
    }

    /// Adopt the server's merged checklist and forget all dirt
    pub fn accept(&mut self, merged: Checklist) {
        self.checklist = merged;
        self.dirty.clear();
    }

    /// Apply one edit
    ///
    /// # Errors
    /// Not-found errors when the edit addresses a missing category or
    /// document; the checklist and mask are left untouched.
    pub fn apply(&mut self, edit: Edit) -> Result<(), ChecklistError> {
        match edit {
            Edit::ToggleSection(section) => {
                self.toggle_section(&section);
                Ok(())
            }
            Edit::ToggleCategory(category) => self.toggle_category(&category).map(|_| ()),
            Edit::AddDocument { category, name } => self.add_document(&category, name).map(|_| ()),
            Edit::RemoveDocument { category, index } => {
                self.remove_document(&category, index).map(|_| ())
            }
            Edit::RenameDocument {
                category,
                index,
                name,
            } => self.rename_document(&category, index, name),
            Edit::SetStatus {
                category,
                index,
                status,
            } => self.set_status(&category, index, status),
            Edit::Upload(upload) => upload.fold_into(&mut self.checklist, &mut self.dirty),
        }
    }

    /// Returns whether the section is selected afterwards
    pub fn toggle_section(&mut self, section: &SectionId) -> bool {
        let selected = self.checklist.toggle_section(section);
        self.dirty.mark_sections();
        selected
    }

    /// Flip a category's active flag; returns the new flag
    ///
    /// A vocabulary category missing from the checklist is created active,
    /// with the vocabulary label and no documents.
    ///
    /// # Errors
    /// `UnknownCategory` if the key is in neither the checklist nor the
    /// vocabulary.
    pub fn toggle_category(&mut self, key: &CategoryKey) -> Result<bool, ChecklistError> {
        let active = if let Some(category) = self.checklist.category_mut(key.as_str()) {
            category.active = !category.active;
            category.active
        } else {
            let label = self
                .vocabulary
                .label_for(key.as_str())
                .ok_or_else(|| ChecklistError::UnknownCategory(key.clone()))?;
            self.checklist
                .insert_category(key.clone(), Category::new(label).with_active(true));
            true
        };

        self.dirty.mark_category(key.clone());
        Ok(active)
    }

    /// Append a document; returns its index
    ///
    /// # Errors
    /// `CategoryNotFound` if the category does not exist.
    pub fn add_document(
        &mut self,
        key: &CategoryKey,
        name: impl Into<String>,
    ) -> Result<usize, ChecklistError> {
        let category = self.checklist.require_category_mut(key.as_str())?;
        category.documents.push(DocumentEntry::new(name));
        let index = category.documents.len() - 1;
        self.dirty.mark_category(key.clone());
        Ok(index)
    }

    /// Remove a document; returns it
    ///
    /// # Errors
    /// Not-found errors for a missing category or index.
    pub fn remove_document(
        &mut self,
        key: &CategoryKey,
        index: usize,
    ) -> Result<DocumentEntry, ChecklistError> {
        let category = self.checklist.require_category_mut(key.as_str())?;
        if index >= category.documents.len() {
            return Err(ChecklistError::out_of_range(
                key.clone(),
                index,
                category.documents.len(),
            ));
        }
        let removed = category.documents.remove(index);
        self.dirty.mark_category(key.clone());
        Ok(removed)
    }

    /// Rename a document
    ///
    /// # Errors
    /// Not-found errors for a missing category or index.
    pub fn rename_document(
        &mut self,
        key: &CategoryKey,
        index: usize,
        name: impl Into<String>,
    ) -> Result<(), ChecklistError> {
        self.checklist.document_mut(key.as_str(), index)?.name = name.into();
        self.dirty.mark_document_name(key.clone(), index);
        Ok(())
    }

    /// Change a document's status
    ///
    /// # Errors
    /// Not-found errors for a missing category or index.
    pub fn set_status(
        &mut self,
        key: &CategoryKey,
        index: usize,
        status: DocumentStatus,
    ) -> Result<(), ChecklistError> {
        self.checklist.document_mut(key.as_str(), index)?.status = status;
        self.dirty.mark_document_status(key.clone(), index);
        Ok(())
    }
}
