//! CRM pipeline stages
//!
//! The CRM tracks a project through many pipeline stage ids; the portal's
//! progress tracker only shows four coarse stages.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Coarse stage shown to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxStage {
    /// Waiting on client documents
    #[default]
    Collecting,
    /// Preparer is working on the return
    Processing,
    /// Return filed
    Submitted,
    /// Return accepted by the tax authority
    Accepted,
}

impl TaxStage {
    /// All stages in tracker order
    pub const ALL: [TaxStage; 4] = [
        Self::Collecting,
        Self::Processing,
        Self::Submitted,
        Self::Accepted,
    ];

    /// Display label
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Collecting => "Collecting Documents",
            Self::Processing => "Processing Return",
            Self::Submitted => "Return Submitted",
            Self::Accepted => "Return Accepted",
        }
    }

    /// Zero-based position in the tracker
    #[must_use]
    pub fn position(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for TaxStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Pipeline stage id to [`TaxStage`] table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StageMap {
    stages: BTreeMap<String, TaxStage>,
}

const STANDARD_STAGES: [(&str, TaxStage); 11] = [
    ("1742632656", TaxStage::Collecting),
    ("1742632682", TaxStage::Processing),
    ("1742632683", TaxStage::Processing),
    ("1742632684", TaxStage::Processing),
    ("1742632685", TaxStage::Processing),
    ("1742632686", TaxStage::Submitted),
    ("1742632687", TaxStage::Submitted),
    ("1742632688", TaxStage::Submitted),
    ("1742632689", TaxStage::Submitted),
    ("1742632690", TaxStage::Submitted),
    ("1742632657", TaxStage::Accepted),
];

impl StageMap {
    /// Create empty map (every id normalizes to `Collecting`)
    #[must_use]
    pub fn empty() -> Self {
        Self {
            stages: BTreeMap::new(),
        }
    }

    /// Stage ids of the tax pipeline
    #[must_use]
    pub fn standard() -> Self {
        let stages = STANDARD_STAGES
            .iter()
            .map(|(id, stage)| ((*id).to_string(), *stage))
            .collect();
        Self { stages }
    }

    /// Add or replace a mapping
    pub fn insert(&mut self, stage_id: impl Into<String>, stage: TaxStage) {
        self.stages.insert(stage_id.into(), stage);
    }

    /// Normalize a pipeline stage id; unknown ids are `Collecting`
    #[must_use]
    pub fn normalize(&self, stage_id: &str) -> TaxStage {
        self.stages
            .get(stage_id.trim())
            .copied()
            .unwrap_or_default()
    }

    /// Number of mapped ids
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Check if nothing is mapped
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Default for StageMap {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_mapping() {
        let map = StageMap::standard();
        assert_eq!(map.len(), 11);
        assert_eq!(map.normalize("1742632656"), TaxStage::Collecting);
        assert_eq!(map.normalize("1742632684"), TaxStage::Processing);
        assert_eq!(map.normalize("1742632690"), TaxStage::Submitted);
        assert_eq!(map.normalize("1742632657"), TaxStage::Accepted);
    }

    #[test]
    fn unknown_stage_is_collecting() {
        assert_eq!(StageMap::standard().normalize("999"), TaxStage::Collecting);
        assert_eq!(StageMap::empty().normalize("1742632657"), TaxStage::Collecting);
    }

    #[test]
    fn positions_follow_tracker_order() {
        let positions: Vec<_> = TaxStage::ALL.iter().map(TaxStage::position).collect();
        assert_eq!(positions, vec![0, 1, 2, 3]);
        assert_eq!(TaxStage::Submitted.to_string(), "Return Submitted");
    }

    #[test]
    fn custom_mapping_deserializes() {
        let map: StageMap = serde_json::from_str(r#"{"42": "processing"}"#).unwrap();
        assert_eq!(map.normalize("42"), TaxStage::Processing);
    }
}
