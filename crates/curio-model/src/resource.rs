//! Resource payloads produced by the mapping engine.
//!
//! A [`ResourcePayload`] is the structured representation of one target
//! resource built from one spreadsheet row. It aggregates metadata values,
//! media descriptors, item-set assignments, and the class/template scalars,
//! and is immutable once handed to a store call.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ModelError, PropertyTerm, ResourceId};

/// Kind of stored resource the importer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Item,
    ItemSet,
    Media,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Item => "item",
            ResourceType::ItemSet => "item_set",
            ResourceType::Media => "media",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "item" | "items" => Ok(ResourceType::Item),
            "item_set" | "item_sets" | "item-set" => Ok(ResourceType::ItemSet),
            "media" => Ok(ResourceType::Media),
            _ => Err(ModelError::InvalidResourceType(value.to_string())),
        }
    }
}

/// How a metadata cell value is interpreted.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// Plain text value.
    #[default]
    Literal,
    /// The value is a URI.
    Uri,
    /// The value references another stored resource by id.
    Resource,
}

/// One metadata value attached to a property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    pub kind: ValueKind,
    pub value: String,
}

impl PropertyValue {
    pub fn literal(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Literal,
            value: value.into(),
        }
    }

    pub fn uri(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Uri,
            value: value.into(),
        }
    }

    pub fn resource(value: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Resource,
            value: value.into(),
        }
    }
}

/// One media creation request carried inside a payload.
///
/// The ingester name passes through opaquely; an unknown name is rejected by
/// the store when the payload is applied. The `html` ingester carries the raw
/// untrimmed token, the `url` ingester the trimmed fetch target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaDescriptor {
    pub ingester: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingest_url: Option<String>,
}

impl MediaDescriptor {
    pub fn new(ingester: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            ingester: ingester.into(),
            source: source.into(),
            html: None,
            ingest_url: None,
        }
    }
}

/// The full structured representation of one target resource for one row.
///
/// List fields keep the order the mappers emitted them in (column-index
/// order). A payload used for a delete only needs enough identifying data to
/// resolve a target and is usually empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourcePayload {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub properties: BTreeMap<PropertyTerm, Vec<PropertyValue>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item_sets: Vec<ResourceId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_template: Option<String>,
}

impl ResourcePayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a value to a property, preserving emission order.
    pub fn push_property(&mut self, term: PropertyTerm, value: PropertyValue) {
        self.properties.entry(term).or_default().push(value);
    }

    /// True when the payload carries no mapped data at all.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.media.is_empty()
            && self.item_sets.is_empty()
            && self.resource_class.is_none()
            && self.resource_template.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_type_parses_aliases() {
        assert_eq!("items".parse::<ResourceType>().unwrap(), ResourceType::Item);
        assert_eq!(
            "item_sets".parse::<ResourceType>().unwrap(),
            ResourceType::ItemSet
        );
        assert!("collection".parse::<ResourceType>().is_err());
    }

    #[test]
    fn payload_starts_empty() {
        let payload = ResourcePayload::new();
        assert!(payload.is_empty());
    }

    #[test]
    fn push_property_preserves_order() {
        let mut payload = ResourcePayload::new();
        let term = PropertyTerm::new("dcterms:subject").unwrap();
        payload.push_property(term.clone(), PropertyValue::literal("first"));
        payload.push_property(term.clone(), PropertyValue::literal("second"));
        let values = &payload.properties[&term];
        assert_eq!(values[0].value, "first");
        assert_eq!(values[1].value, "second");
    }

    #[test]
    fn media_descriptor_omits_absent_fields() {
        let descriptor = MediaDescriptor::new("upload", "scan.tiff");
        let json = serde_json::to_string(&descriptor).expect("serialize descriptor");
        assert!(!json.contains("html"));
        assert!(!json.contains("ingest_url"));
    }
}
