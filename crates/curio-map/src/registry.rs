//! Column mapping registry.
//!
//! Resolves, for each semantic mapping name, the mappers configured for it
//! and dispatches rows to them. The mapper set is closed: every kind the
//! importer understands is a variant of [`ColumnMapper`], constructed from
//! the validated configuration rather than looked up dynamically by name.

use std::fmt;

use curio_model::{ImportConfig, ModelError, RowAction};

use crate::datum::MappedDatum;
use crate::item_set::ItemSetMapper;
use crate::media::MediaMapper;
use crate::property::PropertyMapper;
use crate::resource_info::ResourceInfoMapper;

/// Semantic mapping names the registry can resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapperName {
    Property,
    Media,
    ItemSet,
    ResourceInfo,
}

impl MapperName {
    pub fn as_str(&self) -> &'static str {
        match self {
            MapperName::Property => "property",
            MapperName::Media => "media",
            MapperName::ItemSet => "item_set",
            MapperName::ResourceInfo => "resource_info",
        }
    }
}

impl fmt::Display for MapperName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of column mappers.
#[derive(Debug, Clone)]
pub enum ColumnMapper {
    Property(PropertyMapper),
    Media(MediaMapper),
    ItemSet(ItemSetMapper),
    ResourceInfo(ResourceInfoMapper),
}

impl ColumnMapper {
    pub fn name(&self) -> MapperName {
        match self {
            ColumnMapper::Property(_) => MapperName::Property,
            ColumnMapper::Media(_) => MapperName::Media,
            ColumnMapper::ItemSet(_) => MapperName::ItemSet,
            ColumnMapper::ResourceInfo(_) => MapperName::ResourceInfo,
        }
    }

    /// Column indices this mapper owns, in index order.
    pub fn columns(&self) -> Vec<usize> {
        match self {
            ColumnMapper::Property(mapper) => mapper.columns(),
            ColumnMapper::Media(mapper) => mapper.columns(),
            ColumnMapper::ItemSet(mapper) => mapper.columns(),
            ColumnMapper::ResourceInfo(mapper) => mapper.columns(),
        }
    }

    pub fn map_row(&self, row: &[String]) -> MappedDatum {
        match self {
            ColumnMapper::Property(mapper) => mapper.map_row(row),
            ColumnMapper::Media(mapper) => mapper.map_row(row),
            ColumnMapper::ItemSet(mapper) => mapper.map_row(row),
            ColumnMapper::ResourceInfo(mapper) => mapper.map_row(row),
        }
    }
}

/// Holds the mappers built from one configuration, plus the identifier and
/// action columns, which are read directly rather than mapped into payloads.
#[derive(Debug, Clone)]
pub struct MapperRegistry {
    mappers: Vec<ColumnMapper>,
    identifier_column: Option<usize>,
    action_column: Option<usize>,
}

impl MapperRegistry {
    /// Build the registry from a validated configuration.
    ///
    /// Mappers run in a fixed order (properties, media, item sets, resource
    /// info); a mapping name with no configured columns gets no mapper at
    /// all, which keeps the absent-name case a plain empty list.
    pub fn from_config(config: &ImportConfig) -> Self {
        let mut mappers = Vec::new();
        if !config.properties.is_empty() {
            mappers.push(ColumnMapper::Property(PropertyMapper::from_config(config)));
        }
        if !config.media.is_empty() {
            mappers.push(ColumnMapper::Media(MediaMapper::from_config(config)));
        }
        if !config.item_sets.is_empty() {
            mappers.push(ColumnMapper::ItemSet(ItemSetMapper::from_config(config)));
        }
        if !config.resource_class_columns.is_empty() || !config.resource_template_columns.is_empty()
        {
            mappers.push(ColumnMapper::ResourceInfo(ResourceInfoMapper::from_config(
                config,
            )));
        }
        Self {
            mappers,
            identifier_column: config.identifier_column,
            action_column: config.action_column,
        }
    }

    /// All mappers in dispatch order.
    pub fn mappers(&self) -> &[ColumnMapper] {
        &self.mappers
    }

    /// Mappers registered for a semantic name; empty when the name is not
    /// configured, never an error.
    pub fn mappers_for(&self, name: MapperName) -> Vec<&ColumnMapper> {
        self.mappers
            .iter()
            .filter(|mapper| mapper.name() == name)
            .collect()
    }

    /// The trimmed identifier cell of a row, when an identifier column is
    /// configured and the cell is non-empty.
    pub fn identifier_cell<'a>(&self, row: &'a [String]) -> Option<&'a str> {
        let cell = row.get(self.identifier_column?)?.trim();
        if cell.is_empty() { None } else { Some(cell) }
    }

    /// The per-row action override, if an action column is configured and
    /// the cell is non-empty. An unrecognized token is an error the caller
    /// records as a row failure.
    pub fn row_action(&self, row: &[String]) -> Result<Option<RowAction>, ModelError> {
        let Some(column) = self.action_column else {
            return Ok(None);
        };
        let cell = row.get(column).map(String::as_str).unwrap_or("");
        RowAction::from_cell(cell)
    }
}

#[cfg(test)]
mod tests {
    use curio_model::{PropertyMapping, PropertyTerm, ResourceType};

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| (*cell).to_string()).collect()
    }

    fn config_with_media() -> ImportConfig {
        ImportConfig::new(ResourceType::Item)
            .with_property_column(
                0,
                PropertyMapping::new(PropertyTerm::new("dcterms:title").unwrap()),
            )
            .with_media_column(1, "url")
    }

    #[test]
    fn absent_mapping_name_yields_empty_list() {
        let registry = MapperRegistry::from_config(&config_with_media());
        assert!(registry.mappers_for(MapperName::ItemSet).is_empty());
        assert_eq!(registry.mappers_for(MapperName::Media).len(), 1);
    }

    #[test]
    fn mappers_run_in_fixed_order() {
        let registry = MapperRegistry::from_config(&config_with_media());
        let names: Vec<MapperName> = registry.mappers().iter().map(ColumnMapper::name).collect();
        assert_eq!(names, vec![MapperName::Property, MapperName::Media]);
    }

    #[test]
    fn identifier_cell_is_trimmed_and_empty_is_none() {
        let mut config = config_with_media();
        config.identifier_column = Some(0);
        let registry = MapperRegistry::from_config(&config);
        assert_eq!(registry.identifier_cell(&row(&[" row-1 ", ""])), Some("row-1"));
        assert_eq!(registry.identifier_cell(&row(&["  ", ""])), None);
    }

    #[test]
    fn row_action_reads_the_action_column() {
        let config = config_with_media().with_action_column(2);
        let registry = MapperRegistry::from_config(&config);
        assert_eq!(
            registry.row_action(&row(&["t", "m", "delete"])).unwrap(),
            Some(RowAction::Delete)
        );
        assert_eq!(registry.row_action(&row(&["t", "m", ""])).unwrap(), None);
        assert!(registry.row_action(&row(&["t", "m", "merge"])).is_err());
    }
}
