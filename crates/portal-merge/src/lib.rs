//! Portal Merge Engine
//!
//! Reconciles a client's locally edited checklist against the latest stored
//! one, field by field.
//!
//! # Core Concepts
//!
//! - [`DirtyMask`]: Which leaves of a local checklist were touched since last sync
//! - [`MergeStrategy`]: Pluggable reconciliation of (authoritative, local, mask)
//! - [`FieldLevelMerge`]: Local edits win on touched leaves, stored values elsewhere
//! - [`OverwriteMerge`]: Local snapshot replaces the stored one (admin saves)
//! - [`ChecklistDiff`]: Change list between two snapshots, for audit trails
//!
//! # Example
//!
//! ```rust
//! use portal_checklist::{Category, Checklist, DocumentEntry, DocumentStatus};
//! use portal_merge::{merge, DirtyMask};
//!
//! let mut stored = Checklist::default();
//! stored.insert_category(
//!     "w_2s",
//!     Category::new("W-2s")
//!         .with_active(true)
//!         .with_documents(vec![
//!             DocumentEntry::new("W2").with_status(DocumentStatus::PendingReview),
//!         ]),
//! );
//!
//! let mut local = stored.clone();
//! local.document_mut("w_2s", 0).unwrap().status = DocumentStatus::Accepted;
//!
//! let mut dirty = DirtyMask::new();
//! dirty.mark_document_status("w_2s", 0);
//!
//! let merged = merge(&stored, &local, &dirty);
//! assert_eq!(merged.document("w_2s", 0).unwrap().status, DocumentStatus::Accepted);
//! ```

#![warn(unreachable_pub)]

mod diff;
mod dirty;
mod strategy;

pub use diff::{Change, ChecklistDiff};
pub use dirty::DirtyMask;
pub use strategy::{merge, FieldLevelMerge, MergeStrategy, OverwriteMerge};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
