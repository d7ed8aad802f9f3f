//! Metadata property column mapping.

use std::collections::{BTreeMap, BTreeSet};

use curio_ingest::split_trimmed;
use curio_model::{ImportConfig, PropertyMapping, PropertyValue};

use crate::datum::MappedDatum;

/// Maps metadata columns to property values.
///
/// A column flagged multivalue is split on the separator; otherwise the cell
/// is one value. Values are trimmed and empty values are never emitted:
/// unlike media descriptors, there is nothing useful to store for an empty
/// metadata cell.
#[derive(Debug, Clone)]
pub struct PropertyMapper {
    columns: BTreeMap<usize, PropertyMapping>,
    multivalue_columns: BTreeSet<usize>,
    separator: String,
}

impl PropertyMapper {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            columns: config.properties.clone(),
            multivalue_columns: config.multivalue_columns.clone(),
            separator: config.multivalue_separator.clone(),
        }
    }

    pub fn columns(&self) -> Vec<usize> {
        self.columns.keys().copied().collect()
    }

    pub fn map_row(&self, row: &[String]) -> MappedDatum {
        let mut datum = MappedDatum::new();
        for (&column, mapping) in &self.columns {
            let cell = row.get(column).map(String::as_str).unwrap_or("");
            if self.multivalue_columns.contains(&column) {
                for token in split_trimmed(cell, &self.separator) {
                    datum
                        .properties
                        .push((mapping.term.clone(), value_for(mapping, token)));
                }
            } else {
                let token = cell.trim();
                if !token.is_empty() {
                    datum
                        .properties
                        .push((mapping.term.clone(), value_for(mapping, token)));
                }
            }
        }
        datum
    }
}

fn value_for(mapping: &PropertyMapping, token: &str) -> PropertyValue {
    PropertyValue {
        kind: mapping.kind,
        value: token.to_string(),
    }
}
