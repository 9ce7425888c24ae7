//! Portal Sync
//!
//! Everything around the merge engine: the checklist store, the audit trail,
//! the server-side read-merge-write service, and the client-side editor with
//! debounced auto-save.
//!
//! # Core Concepts
//!
//! - [`ChecklistStore`]: Per-project persistence of the stored checklist
//! - [`SyncService`]: Read, merge, write and audit for each save
//! - [`ChecklistEditor`]: Local edits recorded into a [`DirtyMask`](portal_merge::DirtyMask)
//! - [`AutoSaver`]: Debounced submission of the editor's state
//! - [`PortalConfig`]: Debounce delay, category vocabulary and stage mapping
//!
//! # Example
//!
//! ```rust
//! use portal_checklist::{Category, Checklist, DocumentEntry, DocumentStatus};
//! use portal_merge::DirtyMask;
//! use portal_sync::{Actor, AuditLog, InMemoryChecklistStore, ProjectId, SyncService};
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let service = SyncService::new(
//!     Arc::new(InMemoryChecklistStore::new()),
//!     Arc::new(AuditLog::new()),
//! );
//! let project = ProjectId::new("proj-1");
//!
//! let mut local = Checklist::default();
//! local.insert_category(
//!     "w_2s",
//!     Category::new("W-2s").with_active(true).with_documents(vec![DocumentEntry::new("W2")]),
//! );
//! let mut dirty = DirtyMask::new();
//! dirty.mark_category("w_2s");
//!
//! let saved = service.sync(&project, &Actor::client("c-1"), &local, &dirty).await.unwrap();
//! assert_eq!(saved.document("w_2s", 0).unwrap().status, DocumentStatus::NotSubmitted);
//! # }
//! ```

#![warn(unreachable_pub)]

mod audit;
mod autosave;
mod config;
mod editor;
mod error;
mod service;
mod store;
mod upload;

pub use audit::{Actor, ActorKind, AuditAction, AuditEntry, AuditLog, AuditSink, TracingAuditSink};
pub use autosave::{AutoSaver, LocalTransport, MergeTransport, SaveStatus};
pub use config::{ConfigError, PortalConfig, DEBOUNCE_ENV, DEFAULT_DEBOUNCE_MS};
pub use editor::{ChecklistEditor, Edit};
pub use error::{StoreError, SyncError};
pub use service::SyncService;
pub use store::{ChecklistStore, InMemoryChecklistStore, ProjectId};
pub use upload::UploadEvent;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
