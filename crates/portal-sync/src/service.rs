//! Read-merge-write around the checklist store
//!
//! Every write goes through the same sequence: read the stored checklist,
//! merge the caller's view into it, persist the result, then record an audit
//! entry with the stored-vs-persisted diff. The sequence is not atomic.

use crate::audit::{Actor, AuditAction, AuditEntry, AuditSink};
use crate::error::SyncError;
use crate::store::{ChecklistStore, ProjectId};
use crate::upload::UploadEvent;
use portal_checklist::{CategoryKey, Checklist, ChecklistStats, DocumentStatus};
use portal_merge::{ChecklistDiff, DirtyMask, FieldLevelMerge, MergeStrategy, OverwriteMerge};
use std::sync::Arc;

/// Checklist sync service
pub struct SyncService {
    store: Arc<dyn ChecklistStore>,
    audit: Arc<dyn AuditSink>,
    client_strategy: Box<dyn MergeStrategy>,
    admin_strategy: Box<dyn MergeStrategy>,
}

impl std::fmt::Debug for SyncService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncService")
            .field("client_strategy", &self.client_strategy.name())
            .field("admin_strategy", &self.admin_strategy.name())
            .finish_non_exhaustive()
    }
}

impl SyncService {
    /// Create service with field-level client saves and overwriting admin saves
    #[must_use]
    pub fn new(store: Arc<dyn ChecklistStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            store,
            audit,
            client_strategy: Box::new(FieldLevelMerge::new()),
            admin_strategy: Box::new(OverwriteMerge::new()),
        }
    }

    /// Merge a client's local checklist into the stored one
    ///
    /// Returns the persisted checklist, which the client should adopt as its
    /// new local copy.
    ///
    /// # Errors
    /// - `SyncError::Store` if the read or write fails (retryable for outages)
    #[tracing::instrument(skip_all, fields(project = %project, actor = %actor))]
    pub async fn sync(
        &self,
        project: &ProjectId,
        actor: &Actor,
        local: &Checklist,
        dirty: &DirtyMask,
    ) -> Result<Checklist, SyncError> {
        let stored = self.store.read(project).await?;
        let merged = self.client_strategy.merge(&stored, local, dirty);
        self.commit(project, actor, AuditAction::UpdateDocumentData, &stored, merged)
            .await
    }

    /// Replace the stored checklist with an admin's copy
    ///
    /// # Errors
    /// - `SyncError::Store` if the read or write fails
    #[tracing::instrument(skip_all, fields(project = %project, actor = %actor))]
    pub async fn overwrite(
        &self,
        project: &ProjectId,
        actor: &Actor,
        checklist: &Checklist,
    ) -> Result<Checklist, SyncError> {
        let stored = self.store.read(project).await?;
        let merged = self
            .admin_strategy
            .merge(&stored, checklist, &DirtyMask::new());
        self.commit(project, actor, AuditAction::AdminUpdateDocumentData, &stored, merged)
            .await
    }

    /// Set the review status of one stored document
    ///
    /// # Errors
    /// - `SyncError::Checklist` (not found) if the category or index does not exist
    /// - `SyncError::Store` if the read or write fails
    #[tracing::instrument(
        skip_all,
        fields(
            project = %project,
            actor = %actor,
            category = %category,
            index = index,
            status = %status
        )
    )]
    pub async fn set_document_status(
        &self,
        project: &ProjectId,
        actor: &Actor,
        category: &CategoryKey,
        index: usize,
        status: DocumentStatus,
    ) -> Result<Checklist, SyncError> {
        let stored = self.store.read(project).await?;

        let mut local = stored.clone();
        local.document_mut(category.as_str(), index)?.status = status;
        let mut dirty = DirtyMask::new();
        dirty.mark_document_status(category.clone(), index);

        let merged = self.client_strategy.merge(&stored, &local, &dirty);
        self.commit(project, actor, AuditAction::AdminUpdateDocumentStatus, &stored, merged)
            .await
    }

    /// Mark an uploaded document `pending_review`
    ///
    /// Uploads for documents that no longer exist are ignored; the stored
    /// checklist is returned unchanged and nothing is written.
    ///
    /// # Errors
    /// - `SyncError::Store` if the read or write fails
    #[tracing::instrument(
        skip_all,
        fields(
            project = %project,
            actor = %actor,
            category = %upload.category,
            index = upload.index
        )
    )]
    pub async fn apply_upload(
        &self,
        project: &ProjectId,
        actor: &Actor,
        upload: &UploadEvent,
    ) -> Result<Checklist, SyncError> {
        let stored = self.store.read(project).await?;

        let mut local = stored.clone();
        let mut dirty = DirtyMask::new();
        if let Err(err) = upload.fold_into(&mut local, &mut dirty) {
            tracing::warn!(error = %err, "upload target not in checklist, status unchanged");
            return Ok(stored);
        }

        let merged = self.client_strategy.merge(&stored, &local, &dirty);
        self.commit(project, actor, AuditAction::FileUpload, &stored, merged)
            .await
    }

    /// Document counts for the admin dashboard
    ///
    /// # Errors
    /// - `SyncError::Store` if the read fails
    pub async fn stats(&self, project: &ProjectId) -> Result<ChecklistStats, SyncError> {
        let stored = self.store.read(project).await?;
        Ok(ChecklistStats::of(&stored))
    }

    /// Current stored checklist
    ///
    /// # Errors
    /// - `SyncError::Store` if the read fails
    pub async fn load(&self, project: &ProjectId) -> Result<Checklist, SyncError> {
        Ok(self.store.read(project).await?)
    }

    async fn commit(
        &self,
        project: &ProjectId,
        actor: &Actor,
        action: AuditAction,
        stored: &Checklist,
        merged: Checklist,
    ) -> Result<Checklist, SyncError> {
        if let Err(err) = self.store.write(project, &merged).await {
            tracing::error!(error = %err, %action, "failed to persist checklist");
            return Err(err.into());
        }

        let diff = ChecklistDiff::between(stored, &merged);
        tracing::info!(%action, changes = diff.len(), "checklist saved");
        self.audit
            .record(AuditEntry::new(project.clone(), actor.clone(), action, diff));

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audit::AuditLog;
    use crate::error::StoreError;
    use crate::store::{InMemoryChecklistStore, MockChecklistStore};
    use portal_merge::Change;
    use portal_test_utils::{doc, single_w2, w2_checklist};
    use pretty_assertions::assert_eq;

    struct Fixture {
        store: Arc<InMemoryChecklistStore>,
        audit: Arc<AuditLog>,
        service: SyncService,
        project: ProjectId,
    }

    async fn fixture(initial: Checklist) -> Fixture {
        let store = Arc::new(InMemoryChecklistStore::new());
        let audit = Arc::new(AuditLog::new());
        let project = ProjectId::new("proj-1");
        store.write(&project, &initial).await.unwrap();
        let service = SyncService::new(store.clone(), audit.clone());
        Fixture {
            store,
            audit,
            service,
            project,
        }
    }

    #[tokio::test]
    async fn sync_persists_merged_result_and_audits() {
        let f = fixture(single_w2(DocumentStatus::PendingReview)).await;
        let local = single_w2(DocumentStatus::Accepted);
        let mut dirty = DirtyMask::new();
        dirty.mark_document_status("w_2s", 0);

        let merged = f
            .service
            .sync(&f.project, &Actor::client("c-1"), &local, &dirty)
            .await
            .unwrap();

        assert_eq!(merged, local);
        assert_eq!(f.store.read(&f.project).await.unwrap(), merged);

        let entries = f.audit.recent(&f.project, 10);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::UpdateDocumentData);
        assert_eq!(
            entries[0].diff.changes,
            vec![Change::StatusChanged {
                category: "w_2s".into(),
                index: 0,
                from: DocumentStatus::PendingReview,
                to: DocumentStatus::Accepted,
            }]
        );
    }

    #[tokio::test]
    async fn overwrite_replaces_everything() {
        let f = fixture(single_w2(DocumentStatus::Accepted)).await;
        let admin_copy = w2_checklist(vec![]);

        let saved = f
            .service
            .overwrite(&f.project, &Actor::admin("a-1"), &admin_copy)
            .await
            .unwrap();

        assert_eq!(saved, admin_copy);
        assert_eq!(f.service.load(&f.project).await.unwrap(), admin_copy);
        assert_eq!(
            f.audit.recent(&f.project, 1)[0].action,
            AuditAction::AdminUpdateDocumentData
        );
    }

    #[tokio::test]
    async fn set_document_status_changes_one_document() {
        let f = fixture(w2_checklist(vec![
            doc("W2 A", DocumentStatus::PendingReview),
            doc("W2 B", DocumentStatus::PendingReview),
        ]))
        .await;

        let saved = f
            .service
            .set_document_status(
                &f.project,
                &Actor::admin("a-1"),
                &"w_2s".into(),
                1,
                DocumentStatus::NeedsResubmission,
            )
            .await
            .unwrap();

        assert_eq!(saved.document("w_2s", 0).unwrap().status, DocumentStatus::PendingReview);
        assert_eq!(
            saved.document("w_2s", 1).unwrap().status,
            DocumentStatus::NeedsResubmission
        );
    }

    #[tokio::test]
    async fn set_document_status_on_missing_document_is_not_found() {
        let f = fixture(single_w2(DocumentStatus::PendingReview)).await;

        let err = f
            .service
            .set_document_status(
                &f.project,
                &Actor::admin("a-1"),
                &"w_2s".into(),
                5,
                DocumentStatus::Accepted,
            )
            .await
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(f.audit.is_empty());
    }

    #[tokio::test]
    async fn upload_marks_pending_review() {
        let f = fixture(single_w2(DocumentStatus::NeedsResubmission)).await;

        let saved = f
            .service
            .apply_upload(&f.project, &Actor::client("c-1"), &UploadEvent::new("w_2s", 0))
            .await
            .unwrap();

        assert_eq!(saved.document("w_2s", 0).unwrap().status, DocumentStatus::PendingReview);
        assert_eq!(f.audit.recent(&f.project, 1)[0].action, AuditAction::FileUpload);
    }

    #[tokio::test]
    async fn upload_for_unknown_document_is_ignored() {
        let f = fixture(single_w2(DocumentStatus::NotSubmitted)).await;

        let saved = f
            .service
            .apply_upload(&f.project, &Actor::client("c-1"), &UploadEvent::new("1099s", 0))
            .await
            .unwrap();

        assert_eq!(saved, single_w2(DocumentStatus::NotSubmitted));
        assert!(f.audit.is_empty());
    }

    #[tokio::test]
    async fn stats_counts_stored_documents() {
        let f = fixture(w2_checklist(vec![
            doc("W2 A", DocumentStatus::Accepted),
            doc("W2 B", DocumentStatus::PendingReview),
        ]))
        .await;

        let stats = f.service.stats(&f.project).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.pending_review, 1);
    }

    #[tokio::test]
    async fn write_failure_is_retryable_and_not_audited() {
        let mut store = MockChecklistStore::new();
        store
            .expect_read()
            .returning(|_| Ok(single_w2(DocumentStatus::PendingReview)));
        store
            .expect_write()
            .times(1)
            .returning(|_, _| Err(StoreError::Unavailable("connection reset".into())));
        let audit = Arc::new(AuditLog::new());
        let service = SyncService::new(Arc::new(store), audit.clone());

        let mut dirty = DirtyMask::new();
        dirty.mark_document_status("w_2s", 0);
        let err = service
            .sync(
                &ProjectId::new("proj-1"),
                &Actor::client("c-1"),
                &single_w2(DocumentStatus::Accepted),
                &dirty,
            )
            .await
            .unwrap_err();

        assert!(err.is_retryable());
        assert!(audit.is_empty());
    }

    #[tokio::test]
    async fn read_failure_surfaces_before_merge() {
        let mut store = MockChecklistStore::new();
        store
            .expect_read()
            .returning(|_| Err(StoreError::Unavailable("timeout".into())));
        store.expect_write().never();
        let service = SyncService::new(Arc::new(store), Arc::new(AuditLog::new()));

        let err = service.stats(&ProjectId::new("proj-1")).await.unwrap_err();
        assert!(matches!(err, SyncError::Store(StoreError::Unavailable(_))));
    }
}
