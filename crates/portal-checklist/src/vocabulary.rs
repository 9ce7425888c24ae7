//! Category vocabulary
//!
//! The set of category keys the portal knows how to present, with labels and
//! section membership. Passed around as a value; nothing here is global.

use crate::model::{CategoryKey, Checklist, SectionId};
use serde::{Deserialize, Serialize};

/// One known category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDefinition {
    /// Stored key
    pub key: CategoryKey,
    /// Default display label
    pub label: String,
    /// Section the category belongs to
    pub section: SectionId,
}

impl CategoryDefinition {
    /// Create new definition
    #[inline]
    #[must_use]
    pub fn new(key: &str, label: &str, section: &SectionId) -> Self {
        Self {
            key: CategoryKey::new(key),
            label: label.to_string(),
            section: section.clone(),
        }
    }
}

/// Known category keys in presentation order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    categories: Vec<CategoryDefinition>,
}

const PERSONAL_CATEGORIES: [(&str, &str); 10] = [
    ("w_2s", "W-2s"),
    ("1099s", "1099s"),
    ("k_1s", "K-1s"),
    ("property_expenses", "Property Expenses"),
    ("1098s", "1098s"),
    ("charitable_donations", "Charitable Donations"),
    ("additional_documents", "Additional Documents"),
    ("livestock_sales_and_expenses", "Livestock Sales and Expenses"),
    ("foreign_bank_accounts", "Foreign Bank Accounts"),
    ("previous_personal_tax_returns", "Previous Personal Tax Returns"),
];

const ENTITY_CATEGORIES: [(&str, &str); 9] = [
    ("entity_income", "Entity Income"),
    ("entity_expenses", "Entity Expenses"),
    ("balance_sheet", "Balance Sheet"),
    ("p_l", "P&L"),
    ("trial_balance", "Trial Balance"),
    ("general_ledger", "General Ledger"),
    ("additions_and_disposals", "Additions and Disposals"),
    ("business_operation_agreement", "Business Operation Agreement"),
    ("previous_entity_tax_returns", "Previous Entity Tax Returns"),
];

impl Vocabulary {
    /// Create vocabulary from definitions
    #[must_use]
    pub fn new(categories: Vec<CategoryDefinition>) -> Self {
        Self { categories }
    }

    /// The 19 standard personal and entity categories
    #[must_use]
    pub fn standard() -> Self {
        let personal = SectionId::personal();
        let entity = SectionId::entity();

        let categories = PERSONAL_CATEGORIES
            .iter()
            .map(|(key, label)| CategoryDefinition::new(key, label, &personal))
            .chain(
                ENTITY_CATEGORIES
                    .iter()
                    .map(|(key, label)| CategoryDefinition::new(key, label, &entity)),
            )
            .collect();

        Self { categories }
    }

    /// Definition by key
    #[must_use]
    pub fn definition(&self, key: &str) -> Option<&CategoryDefinition> {
        self.categories.iter().find(|def| def.key.as_str() == key)
    }

    /// Default label by key
    #[must_use]
    pub fn label_for(&self, key: &str) -> Option<&str> {
        self.definition(key).map(|def| def.label.as_str())
    }

    /// Check if key is known
    #[inline]
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.definition(key).is_some()
    }

    /// All definitions
    #[inline]
    #[must_use]
    pub fn definitions(&self) -> &[CategoryDefinition] {
        &self.categories
    }

    /// Definitions belonging to one section
    pub fn categories_in<'a>(
        &'a self,
        section: &'a SectionId,
    ) -> impl Iterator<Item = &'a CategoryDefinition> + 'a {
        self.categories
            .iter()
            .filter(move |def| &def.section == section)
    }

    /// Per-section view of a checklist
    ///
    /// Only effective sections are listed. Within a section, active
    /// categories come first; otherwise vocabulary order is kept. Keys unknown
    /// to the vocabulary are not shown (they stay in the checklist itself).
    #[must_use]
    pub fn layout(&self, checklist: &Checklist) -> Vec<SectionLayout> {
        checklist
            .effective_sections()
            .into_iter()
            .map(|section| {
                let mut entries: Vec<LayoutEntry> = self
                    .categories_in(&section)
                    .map(|def| {
                        let category = checklist.category(def.key.as_str());
                        LayoutEntry {
                            key: def.key.clone(),
                            label: category
                                .map_or_else(|| def.label.clone(), |c| c.label.clone()),
                            active: category.is_some_and(|c| c.active),
                            document_count: category.map_or(0, |c| c.documents.len()),
                        }
                    })
                    .collect();
                entries.sort_by_key(|entry| !entry.active);

                SectionLayout { section, entries }
            })
            .collect()
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        Self::standard()
    }
}

/// Categories shown under one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionLayout {
    /// Section shown
    pub section: SectionId,
    /// Categories, active first
    pub entries: Vec<LayoutEntry>,
}

/// One category row in a [`SectionLayout`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutEntry {
    /// Category key
    pub key: CategoryKey,
    /// Label from the checklist, else the vocabulary
    pub label: String,
    /// Whether the category applies
    pub active: bool,
    /// Number of requested documents
    pub document_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Category, DocumentEntry};

    #[test]
    fn standard_has_nineteen_categories() {
        let vocabulary = Vocabulary::standard();
        assert_eq!(vocabulary.definitions().len(), 19);
        assert_eq!(vocabulary.categories_in(&SectionId::personal()).count(), 10);
        assert_eq!(vocabulary.categories_in(&SectionId::entity()).count(), 9);
    }

    #[test]
    fn label_lookup() {
        let vocabulary = Vocabulary::standard();
        assert_eq!(vocabulary.label_for("p_l"), Some("P&L"));
        assert_eq!(vocabulary.label_for("crypto"), None);
        assert!(vocabulary.contains("w_2s"));
    }

    #[test]
    fn layout_lists_active_first() {
        let vocabulary = Vocabulary::standard();
        let mut checklist = Checklist::default();
        checklist.insert_category(
            "1098s",
            Category::new("Mortgage interest")
                .with_active(true)
                .with_documents(vec![DocumentEntry::new("1098")]),
        );

        let layout = vocabulary.layout(&checklist);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].section, SectionId::personal());

        let first = &layout[0].entries[0];
        assert_eq!(first.key.as_str(), "1098s");
        assert_eq!(first.label, "Mortgage interest");
        assert_eq!(first.document_count, 1);

        // the remaining inactive rows keep vocabulary order
        assert_eq!(layout[0].entries[1].key.as_str(), "w_2s");
    }

    #[test]
    fn layout_follows_effective_sections() {
        let vocabulary = Vocabulary::standard();
        let checklist = Checklist::with_sections([SectionId::entity()]);

        let layout = vocabulary.layout(&checklist);
        assert_eq!(layout.len(), 1);
        assert_eq!(layout[0].section, SectionId::entity());
        assert_eq!(layout[0].entries.len(), 9);
    }
}
