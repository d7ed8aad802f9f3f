//! Item-set assignment mapping.

use curio_ingest::split_trimmed;
use curio_model::{ImportConfig, ResourceId};

use crate::datum::MappedDatum;

/// Maps item-set columns to item-set id assignments.
///
/// Cells hold numeric internal ids, optionally several per cell. A token
/// that does not parse as an id is logged and skipped; the row itself is not
/// failed for a malformed sidecar column.
#[derive(Debug, Clone)]
pub struct ItemSetMapper {
    columns: Vec<usize>,
    separator: String,
}

impl ItemSetMapper {
    pub fn from_config(config: &ImportConfig) -> Self {
        let mut columns = config.item_sets.clone();
        columns.sort_unstable();
        columns.dedup();
        Self {
            columns,
            separator: config.multivalue_separator.clone(),
        }
    }

    pub fn columns(&self) -> Vec<usize> {
        self.columns.clone()
    }

    pub fn map_row(&self, row: &[String]) -> MappedDatum {
        let mut datum = MappedDatum::new();
        for &column in &self.columns {
            let cell = row.get(column).map(String::as_str).unwrap_or("");
            for token in split_trimmed(cell, &self.separator) {
                match token.parse::<u64>() {
                    Ok(id) => datum.item_sets.push(ResourceId::new(id)),
                    Err(_) => {
                        tracing::warn!(column, token, "ignoring non-numeric item set id");
                    }
                }
            }
        }
        datum
    }
}
