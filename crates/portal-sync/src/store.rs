//! Checklist persistence
//!
//! The store holds one encoded checklist per project. Reads never fail on
//! malformed data; they fall back to the default checklist the same way a
//! project that has never been written does.

use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashMap;
use portal_checklist::Checklist;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project identifier (CRM project id)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(String);

impl ProjectId {
    /// Create new project id
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as string slice
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ProjectId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Backing store for checklists, keyed by project
///
/// Writes replace the whole checklist. There is no compare-and-swap, so a
/// read-merge-write sequence can lose a concurrent write landing in between.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChecklistStore: Send + Sync {
    /// Current checklist, or the default for a project never written
    async fn read(&self, project: &ProjectId) -> Result<Checklist, StoreError>;

    /// Replace the stored checklist
    async fn write(&self, project: &ProjectId, checklist: &Checklist) -> Result<(), StoreError>;
}

/// In-process store keeping the stored JSON text per project
#[derive(Debug, Default)]
pub struct InMemoryChecklistStore {
    documents: DashMap<ProjectId, String>,
}

impl InMemoryChecklistStore {
    /// Create empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a project with raw stored text, as an external writer would
    pub fn insert_raw(&self, project: ProjectId, raw: impl Into<String>) {
        self.documents.insert(project, raw.into());
    }

    /// Raw stored text for a project
    #[must_use]
    pub fn raw(&self, project: &ProjectId) -> Option<String> {
        self.documents.get(project).map(|entry| entry.value().clone())
    }

    /// Number of projects with stored data
    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Check if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[async_trait]
impl ChecklistStore for InMemoryChecklistStore {
    async fn read(&self, project: &ProjectId) -> Result<Checklist, StoreError> {
        let raw = self.raw(project);
        Ok(Checklist::from_stored(raw.as_deref()))
    }

    async fn write(&self, project: &ProjectId, checklist: &Checklist) -> Result<(), StoreError> {
        let encoded = checklist.to_json_string()?;
        self.documents.insert(project.clone(), encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use portal_checklist::{Category, DocumentEntry, SectionId};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn unknown_project_reads_default() {
        let store = InMemoryChecklistStore::new();
        let checklist = store.read(&ProjectId::new("p-1")).await.unwrap();
        assert_eq!(checklist, Checklist::default());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn write_then_read() {
        let store = InMemoryChecklistStore::new();
        let project = ProjectId::new("p-1");
        let mut checklist = Checklist::with_sections([SectionId::personal(), SectionId::entity()]);
        checklist.insert_category(
            "p_l",
            Category::new("P&L")
                .with_active(true)
                .with_documents(vec![DocumentEntry::new("2024 P&L")]),
        );

        store.write(&project, &checklist).await.unwrap();

        assert_eq!(store.read(&project).await.unwrap(), checklist);
        assert_eq!(store.len(), 1);
        let raw = store.raw(&project).unwrap();
        assert!(raw.starts_with(r#"{"_meta":{"selectedSections":["personal","entity"]}"#));
    }

    #[tokio::test]
    async fn malformed_stored_text_reads_default() {
        let store = InMemoryChecklistStore::new();
        let project = ProjectId::new("p-1");
        store.insert_raw(project.clone(), "{not json");
        assert_eq!(store.read(&project).await.unwrap(), Checklist::default());
    }
}
