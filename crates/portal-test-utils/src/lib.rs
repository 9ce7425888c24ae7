//! Testing utilities for the document portal workspace
//!
//! Shared fixtures and proptest strategies.

#![allow(missing_docs)]

use portal_checklist::{Category, Checklist, DocumentEntry, DocumentStatus, SectionId};
use portal_merge::DirtyMask;
use proptest::collection::{btree_map, vec};
use proptest::prelude::*;

/// Category keys used by generated checklists; small so snapshots overlap
pub const KEY_POOL: [&str; 4] = ["w_2s", "1099s", "k_1s", "p_l"];

pub fn doc(name: &str, status: DocumentStatus) -> DocumentEntry {
    DocumentEntry::new(name).with_status(status)
}

pub fn w2_category(documents: Vec<DocumentEntry>) -> Category {
    Category::new("W-2s").with_active(true).with_documents(documents)
}

/// Personal checklist with one active `w_2s` category
pub fn w2_checklist(documents: Vec<DocumentEntry>) -> Checklist {
    let mut checklist = Checklist::default();
    checklist.insert_category("w_2s", w2_category(documents));
    checklist
}

/// The single-W2 checklist most scenarios start from
pub fn single_w2(status: DocumentStatus) -> Checklist {
    w2_checklist(vec![doc("W2", status)])
}

pub fn arb_status() -> impl Strategy<Value = DocumentStatus> {
    prop::sample::select(DocumentStatus::ALL.to_vec())
}

pub fn arb_document() -> impl Strategy<Value = DocumentEntry> {
    ("[A-Za-z0-9 ]{1,12}", arb_status()).prop_map(|(name, status)| doc(&name, status))
}

pub fn arb_category() -> impl Strategy<Value = Category> {
    ("[A-Z][a-z]{0,8}", any::<bool>(), vec(arb_document(), 0..4)).prop_map(
        |(label, active, documents)| {
            Category::new(label)
                .with_active(active)
                .with_documents(documents)
        },
    )
}

pub fn arb_sections() -> impl Strategy<Value = Vec<SectionId>> {
    prop::sample::subsequence(vec![SectionId::personal(), SectionId::entity()], 0..=2)
}

/// Checklist over [`KEY_POOL`] with non-empty document names
pub fn arb_checklist() -> impl Strategy<Value = Checklist> {
    (
        arb_sections(),
        btree_map(prop::sample::select(KEY_POOL.to_vec()), arb_category(), 0..=KEY_POOL.len()),
    )
        .prop_map(|(sections, categories)| {
            let mut checklist = Checklist::with_sections(sections);
            for (key, category) in categories {
                checklist.insert_category(key, category);
            }
            checklist
        })
}

/// Mask over [`KEY_POOL`] with indices inside the generated document range
pub fn arb_dirty_mask() -> impl Strategy<Value = DirtyMask> {
    let key = || prop::sample::select(KEY_POOL.to_vec());
    let index_flags = || btree_map(key(), vec(0usize..4, 0..3), 0..3);

    (
        any::<bool>(),
        vec(key(), 0..3),
        index_flags(),
        index_flags(),
    )
        .prop_map(|(sections, structural, names, statuses)| {
            let mut mask = DirtyMask::new();
            if sections {
                mask.mark_sections();
            }
            for key in structural {
                mask.mark_category(key);
            }
            for (key, indices) in names {
                for index in indices {
                    mask.mark_document_name(key, index);
                }
            }
            for (key, indices) in statuses {
                for index in indices {
                    mask.mark_document_status(key, index);
                }
            }
            mask
        })
}
