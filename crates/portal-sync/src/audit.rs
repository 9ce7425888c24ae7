//! Audit trail of checklist writes
//!
//! Recording is fire-and-forget: sinks cannot fail a save.

use crate::store::ProjectId;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use portal_merge::ChecklistDiff;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use ulid::Ulid;

/// Who is writing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorKind {
    /// Customer using the portal
    Client,
    /// Staff using the admin console
    Admin,
    /// Staff using the card embedded in the CRM
    CrmCard,
}

/// Identity attached to every write
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Actor {
    /// Actor category
    pub kind: ActorKind,
    /// User id or email
    pub id: String,
}

impl Actor {
    /// Client actor
    #[must_use]
    pub fn client(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Client,
            id: id.into(),
        }
    }

    /// Admin actor
    #[must_use]
    pub fn admin(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::Admin,
            id: id.into(),
        }
    }

    /// CRM card actor
    #[must_use]
    pub fn crm_card(id: impl Into<String>) -> Self {
        Self {
            kind: ActorKind::CrmCard,
            id: id.into(),
        }
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            ActorKind::Client => "client",
            ActorKind::Admin => "admin",
            ActorKind::CrmCard => "crm_card",
        };
        write!(f, "{kind}:{}", self.id)
    }
}

/// Kind of write being audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// Client field-level save
    UpdateDocumentData,
    /// Admin wholesale save
    AdminUpdateDocumentData,
    /// Admin review of a single document
    AdminUpdateDocumentStatus,
    /// Upload marked a document for review
    FileUpload,
}

impl AuditAction {
    /// Stored action name
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UpdateDocumentData => "update_document_data",
            Self::AdminUpdateDocumentData => "admin_update_document_data",
            Self::AdminUpdateDocumentStatus => "admin_update_document_status",
            Self::FileUpload => "file_upload",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audited write
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditEntry {
    /// Unique, time-ordered id
    pub id: Ulid,
    /// When the write was persisted
    pub at: DateTime<Utc>,
    /// Project written
    pub project: ProjectId,
    /// Who wrote
    pub actor: Actor,
    /// What kind of write
    pub action: AuditAction,
    /// Stored checklist before vs after
    pub diff: ChecklistDiff,
}

impl AuditEntry {
    /// Create entry stamped now
    #[must_use]
    pub fn new(project: ProjectId, actor: Actor, action: AuditAction, diff: ChecklistDiff) -> Self {
        Self {
            id: Ulid::new(),
            at: Utc::now(),
            project,
            actor,
            action,
            diff,
        }
    }
}

/// Destination for audit entries
pub trait AuditSink: Send + Sync {
    /// Record an entry
    fn record(&self, entry: AuditEntry);
}

/// In-memory audit log, queryable per project
#[derive(Debug, Default)]
pub struct AuditLog {
    entries: RwLock<HashMap<ProjectId, Vec<AuditEntry>>>,
}

impl AuditLog {
    /// Create empty log
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Most recent entries for a project, newest first
    #[must_use]
    pub fn recent(&self, project: &ProjectId, limit: usize) -> Vec<AuditEntry> {
        self.entries
            .read()
            .get(project)
            .map(|entries| entries.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Number of entries across all projects
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().values().map(Vec::len).sum()
    }

    /// Check if nothing was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for AuditLog {
    fn record(&self, entry: AuditEntry) {
        self.entries
            .write()
            .entry(entry.project.clone())
            .or_default()
            .push(entry);
    }
}

/// Sink that emits each entry as a tracing event
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: AuditEntry) {
        tracing::info!(
            audit_id = %entry.id,
            project = %entry.project,
            actor = %entry.actor,
            action = %entry.action,
            changes = entry.diff.len(),
            "{}",
            entry.diff.summary()
        );
    }
}
