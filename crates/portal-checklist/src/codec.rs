//! Stored JSON codec
//!
//! The CRM keeps a checklist as one flat JSON object:
//!
//! ```json
//! {
//!   "_meta": { "selectedSections": ["personal"] },
//!   "w_2s":  { "label": "W-2s", "status": "active",
//!              "documents": [{ "name": "W2", "status": "pending_review" }] }
//! }
//! ```
//!
//! Decoding never fails on shape problems: malformed categories and documents
//! are replaced by defaults so a merge always has something to work with.
//! Fields and entries the model does not know are carried through to the
//! encoded form unchanged.

use crate::error::ChecklistError;
use crate::model::{
    Category, CategoryKey, Checklist, DocumentEntry, DocumentStatus, SectionId, SectionsMeta,
};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Reserved key holding [`SectionsMeta`]
pub const META_KEY: &str = "_meta";

const SELECTED_SECTIONS: &str = "selectedSections";
const ACTIVE: &str = "active";
const INACTIVE: &str = "inactive";
const CATEGORY_FIELDS: [&str; 4] = ["label", "status", ACTIVE, "documents"];

/// A classified top-level entry of a stored checklist
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// Section selection wrapper
    Meta(SectionsMeta),
    /// Document category
    Category(Category),
}

impl Entry {
    /// Classify a stored entry by its key and shape
    ///
    /// `_meta` is always meta. Any other key is meta-shaped only when it
    /// carries `selectedSections` and no `documents`; everything else decodes
    /// as a category.
    #[must_use]
    pub fn classify(key: &str, value: &Value) -> Self {
        if key == META_KEY {
            return Self::Meta(SectionsMeta::from_value(value));
        }

        match value {
            Value::Object(map)
                if map.contains_key(SELECTED_SECTIONS) && !map.contains_key("documents") =>
            {
                Self::Meta(SectionsMeta::from_value(value))
            }
            _ => Self::Category(Category::from_value(key, value)),
        }
    }
}

impl SectionsMeta {
    /// Decode leniently; non-string sections are skipped
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let Value::Object(map) = value else {
            return Self::default();
        };

        let sections = map
            .get(SELECTED_SECTIONS)
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
            .map(SectionId::from);

        let mut meta = Self::with_sections(sections);
        meta.extra = map
            .iter()
            .filter(|(k, _)| k.as_str() != SELECTED_SECTIONS)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        meta
    }
}

impl DocumentEntry {
    /// Decode leniently; unknown status reads as `not_submitted`
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let name = value
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let status = value
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<DocumentStatus>().ok())
            .unwrap_or_default();

        Self::new(name).with_status(status)
    }
}

impl Category {
    /// Decode leniently; `key` is the label of last resort
    ///
    /// Accepts both the stored `"status": "active"` form and a boolean
    /// `"active"` field.
    #[must_use]
    pub fn from_value(key: &str, value: &Value) -> Self {
        let Value::Object(map) = value else {
            tracing::debug!(category = key, "non-object category replaced by default");
            return Self::absent(key);
        };

        let label = map
            .get("label")
            .and_then(Value::as_str)
            .unwrap_or(key)
            .to_string();

        let active = match (map.get("status"), map.get(ACTIVE)) {
            (Some(Value::String(status)), _) => status == ACTIVE,
            (_, Some(Value::Bool(active))) => *active,
            _ => false,
        };

        // one entry per stored element so positions stay aligned
        let documents = map
            .get("documents")
            .and_then(Value::as_array)
            .map(|docs| {
                docs.iter()
                    .map(|doc| {
                        if doc.is_object() {
                            DocumentEntry::from_value(doc)
                        } else {
                            tracing::debug!(
                                category = key,
                                "non-object document replaced by default"
                            );
                            DocumentEntry::new("")
                        }
                    })
                    .collect()
            })
            .unwrap_or_default();

        let extra = map
            .iter()
            .filter(|(k, _)| !CATEGORY_FIELDS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            label,
            active,
            documents,
            extra,
        }
    }
}

impl Checklist {
    /// Decode a JSON value leniently
    ///
    /// A non-object value decodes as a checklist with no sections and no
    /// categories. A missing `_meta` leaves the section list empty, which
    /// [`Checklist::effective_sections`] reads as `personal`. Meta-shaped
    /// entries under other keys are kept opaquely in [`Checklist::extra`].
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let mut checklist = Self::with_sections([]);

        let Value::Object(map) = value else {
            tracing::warn!("document data is not a JSON object, using empty checklist");
            return checklist;
        };

        for (key, entry) in map {
            match Entry::classify(key, entry) {
                Entry::Meta(meta) if key == META_KEY => checklist.meta = meta,
                Entry::Meta(_) => {
                    tracing::debug!(key = key.as_str(), "passing through stray meta-shaped entry");
                    checklist.extra.insert(key.clone(), entry.clone());
                }
                Entry::Category(category) => {
                    checklist
                        .categories
                        .insert(CategoryKey::new(key.clone()), category);
                }
            }
        }

        checklist
    }

    /// Parse stored JSON text
    ///
    /// # Errors
    /// [`ChecklistError::Json`] when the text is not JSON at all. Shape
    /// problems inside valid JSON never error.
    pub fn from_json_str(s: &str) -> Result<Self, ChecklistError> {
        let value: Value = serde_json::from_str(s)?;
        Ok(Self::from_value(&value))
    }

    /// Parse the stored property, falling back to [`Checklist::default`]
    ///
    /// Used where a project's `document_data` may be absent, blank or corrupt.
    #[must_use]
    pub fn from_stored(stored: Option<&str>) -> Self {
        match stored.map(str::trim) {
            None | Some("") => Self::default(),
            Some(raw) => Self::from_json_str(raw).unwrap_or_else(|err| {
                tracing::warn!(error = %err, "failed to parse document data, returning default");
                Self::default()
            }),
        }
    }

    /// Encode as a JSON value in stored form
    ///
    /// # Errors
    /// Propagates serializer errors (none occur for well-formed maps).
    pub fn to_value(&self) -> Result<Value, ChecklistError> {
        Ok(serde_json::to_value(self)?)
    }

    /// Encode as compact JSON text in stored form
    ///
    /// # Errors
    /// Propagates serializer errors.
    pub fn to_json_string(&self) -> Result<String, ChecklistError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for SectionsMeta {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.extra.len() + 1))?;
        map.serialize_entry(SELECTED_SECTIONS, &self.selected_sections)?;
        for (key, value) in &self.extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let extra: Vec<_> = self
            .extra
            .iter()
            .filter(|(k, _)| !CATEGORY_FIELDS.contains(&k.as_str()))
            .collect();

        let mut map = serializer.serialize_map(Some(extra.len() + 3))?;
        map.serialize_entry("label", &self.label)?;
        map.serialize_entry("status", if self.active { ACTIVE } else { INACTIVE })?;
        map.serialize_entry("documents", &self.documents)?;
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl Serialize for Checklist {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        // categories win over pass-through entries under the same key
        let extra: Vec<_> = self
            .extra
            .iter()
            .filter(|(k, _)| k.as_str() != META_KEY && !self.categories.contains_key(k.as_str()))
            .collect();

        let mut map = serializer.serialize_map(Some(self.categories.len() + extra.len() + 1))?;
        map.serialize_entry(META_KEY, &self.meta)?;
        for (key, category) in &self.categories {
            map.serialize_entry(key.as_str(), category)?;
        }
        for (key, value) in extra {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectionsMeta {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

impl<'de> Deserialize<'de> for DocumentEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value("", &value))
    }
}

impl<'de> Deserialize<'de> for Checklist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(|value| Self::from_value(&value))
    }
}
