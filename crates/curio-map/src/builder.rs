//! Resource payload assembly.
//!
//! Runs every registered mapper over a row and merges their datums into one
//! [`ResourcePayload`]. The result is deterministic for a given row and
//! configuration: mappers run in a fixed order and each mapper emits its
//! columns in index order.

use curio_model::{ImportConfig, ResourcePayload};

use crate::datum::assign_scalar;
use crate::registry::MapperRegistry;

/// Builds one payload per row from the configured mappers.
#[derive(Debug, Clone)]
pub struct PayloadBuilder {
    registry: MapperRegistry,
}

impl PayloadBuilder {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            registry: MapperRegistry::from_config(config),
        }
    }

    pub fn registry(&self) -> &MapperRegistry {
        &self.registry
    }

    /// Merge rule: list fields concatenate in mapper/column order, item-set
    /// assignments are deduplicated, scalars resolve last-writer-wins with a
    /// warning on conflict.
    pub fn build_row(&self, row: &[String]) -> ResourcePayload {
        let mut payload = ResourcePayload::new();
        for mapper in self.registry.mappers() {
            let datum = mapper.map_row(row);
            for (term, value) in datum.properties {
                payload.push_property(term, value);
            }
            payload.media.extend(datum.media);
            for id in datum.item_sets {
                if !payload.item_sets.contains(&id) {
                    payload.item_sets.push(id);
                }
            }
            assign_scalar(
                &mut payload.resource_class,
                datum.resource_class,
                "resource_class",
            );
            assign_scalar(
                &mut payload.resource_template,
                datum.resource_template,
                "resource_template",
            );
        }
        payload
    }
}
