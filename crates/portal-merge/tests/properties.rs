//! Property tests for field-level merge

use portal_checklist::Checklist;
use portal_merge::{merge, DirtyMask};
use portal_test_utils::{arb_checklist, arb_dirty_mask};
use proptest::prelude::*;

proptest! {
    #[test]
    fn merge_with_self_and_clean_mask_is_identity(checklist in arb_checklist()) {
        prop_assert_eq!(merge(&checklist, &checklist, &DirtyMask::new()), checklist);
    }

    #[test]
    fn no_stored_category_is_lost(
        stored in arb_checklist(),
        local in arb_checklist(),
        dirty in arb_dirty_mask(),
    ) {
        let merged = merge(&stored, &local, &dirty);
        for key in stored.categories.keys() {
            prop_assert!(merged.categories.contains_key(key));
        }
        for key in local.categories.keys() {
            prop_assert!(merged.categories.contains_key(key));
        }
    }

    #[test]
    fn touched_leaves_come_from_local(
        stored in arb_checklist(),
        local in arb_checklist(),
        dirty in arb_dirty_mask(),
    ) {
        let merged = merge(&stored, &local, &dirty);

        if dirty.sections_touched {
            prop_assert_eq!(merged.sections(), local.sections());
        }

        for (key, index, doc) in local.documents() {
            let merged_doc = merged.document(key.as_str(), index);
            prop_assert!(merged_doc.is_ok() || !dirty.touched_categories().contains(key));
            let Ok(merged_doc) = merged_doc else { continue };

            if dirty.is_status_touched(key.as_str(), index) {
                prop_assert_eq!(merged_doc.status, doc.status);
            }
            if dirty.is_name_touched(key.as_str(), index)
                || dirty.is_category_touched(key.as_str())
            {
                prop_assert_eq!(&merged_doc.name, &doc.name);
            }
        }
    }

    #[test]
    fn untouched_leaves_come_from_stored(
        stored in arb_checklist(),
        local in arb_checklist(),
        dirty in arb_dirty_mask(),
    ) {
        let merged = merge(&stored, &local, &dirty);

        if !dirty.sections_touched {
            prop_assert_eq!(merged.sections(), stored.sections());
        }

        for (key, category) in &stored.categories {
            if dirty.is_category_touched(key.as_str()) {
                continue;
            }
            let merged_category = &merged.categories[key];
            prop_assert_eq!(&merged_category.label, &category.label);
            prop_assert_eq!(merged_category.active, category.active);

            for (index, doc) in category.documents.iter().enumerate() {
                // per-field merges follow local positions; slots past them are gone
                let Some(merged_doc) = merged_category.document(index) else { continue };
                if !dirty.is_status_touched(key.as_str(), index) {
                    prop_assert_eq!(merged_doc.status, doc.status);
                }
                if !dirty.is_name_touched(key.as_str(), index) {
                    prop_assert_eq!(&merged_doc.name, &doc.name);
                }
            }
        }
    }

    #[test]
    fn overwrite_never_looks_at_stored(stored in arb_checklist(), local in arb_checklist()) {
        use portal_merge::{MergeStrategy, OverwriteMerge};
        let merged: Checklist = OverwriteMerge::new().merge(&stored, &local, &DirtyMask::new());
        prop_assert_eq!(merged, local);
    }
}
