//! The output of one column mapper for one row.

use serde::{Deserialize, Serialize};

use curio_model::{MediaDescriptor, PropertyTerm, PropertyValue, ResourceId};

/// A partial resource payload produced by a single mapper.
///
/// Property values are kept as an ordered list of `(term, value)` pairs so
/// that merging several datums preserves column-index emission order within
/// each term.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MappedDatum {
    pub properties: Vec<(PropertyTerm, PropertyValue)>,
    pub media: Vec<MediaDescriptor>,
    pub item_sets: Vec<ResourceId>,
    pub resource_class: Option<String>,
    pub resource_template: Option<String>,
}

impl MappedDatum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.media.is_empty()
            && self.item_sets.is_empty()
            && self.resource_class.is_none()
            && self.resource_template.is_none()
    }
}

/// Assign a scalar field, warning when a conflicting non-empty value is
/// already present. Last writer wins.
pub(crate) fn assign_scalar(slot: &mut Option<String>, value: Option<String>, field: &'static str) {
    let Some(value) = value else { return };
    if let Some(existing) = slot.as_deref() {
        if existing != value {
            tracing::warn!(
                field,
                existing,
                value = value.as_str(),
                "conflicting scalar mapping; keeping the later value"
            );
        }
    }
    *slot = Some(value);
}
