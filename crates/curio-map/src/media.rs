//! Media column mapping.
//!
//! Turns the cells of the configured media columns into media-creation
//! descriptors, one per multivalue token. The ingester name is taken from
//! the column's mapping and passed through opaquely; an unknown name is the
//! store's problem, not the mapper's.

use std::collections::BTreeMap;

use curio_ingest::split_with_policy;
use curio_model::{EmptyCellPolicy, ImportConfig, MediaDescriptor};

use crate::datum::MappedDatum;

/// Ingesters with extra payload fields beyond `source`.
const INGESTER_HTML: &str = "html";
const INGESTER_URL: &str = "url";

/// Maps media columns to media descriptors.
///
/// Pure function of the row and the configuration: no store access, no side
/// effects, no error conditions.
#[derive(Debug, Clone)]
pub struct MediaMapper {
    /// Column index to ingester name, iterated in index order.
    columns: BTreeMap<usize, String>,
    separator: String,
    empty_cells: EmptyCellPolicy,
}

impl MediaMapper {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            columns: config.media.clone(),
            separator: config.multivalue_separator.clone(),
            empty_cells: config.empty_cells,
        }
    }

    pub fn columns(&self) -> Vec<usize> {
        self.columns.keys().copied().collect()
    }

    pub fn map_row(&self, row: &[String]) -> MappedDatum {
        let mut datum = MappedDatum::new();
        for (&column, ingester) in &self.columns {
            let cell = row.get(column).map(String::as_str).unwrap_or("");
            // A cell can hold more than one file reference; every token
            // becomes its own descriptor.
            for token in split_with_policy(cell, &self.separator, self.empty_cells) {
                let mut descriptor = MediaDescriptor::new(ingester.clone(), token.trim());
                match ingester.as_str() {
                    // The HTML body keeps the raw token, untrimmed.
                    INGESTER_HTML => descriptor.html = Some(token.to_string()),
                    INGESTER_URL => descriptor.ingest_url = Some(token.trim().to_string()),
                    _ => {}
                }
                datum.media.push(descriptor);
            }
        }
        datum
    }
}

#[cfg(test)]
mod tests {
    use curio_model::{PropertyTerm, PropertyMapping, ResourceType};

    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|cell| (*cell).to_string()).collect()
    }

    #[test]
    fn one_descriptor_per_token() {
        let config = ImportConfig::new(ResourceType::Item)
            .with_multivalue_separator(";")
            .with_media_column(0, "url");
        let mapper = MediaMapper::from_config(&config);
        let datum = mapper.map_row(&row(&["http://a;http://b"]));
        assert_eq!(datum.media.len(), 2);
        assert_eq!(datum.media[0].source, "http://a");
        assert_eq!(datum.media[1].source, "http://b");
        assert!(datum.media.iter().all(|media| media.ingester == "url"));
    }

    #[test]
    fn url_ingester_carries_trimmed_target() {
        let config = ImportConfig::new(ResourceType::Item)
            .with_multivalue_separator(";")
            .with_media_column(0, "url");
        let mapper = MediaMapper::from_config(&config);
        let datum = mapper.map_row(&row(&[" http://a "]));
        assert_eq!(datum.media[0].source, "http://a");
        assert_eq!(datum.media[0].ingest_url.as_deref(), Some("http://a"));
        assert!(datum.media[0].html.is_none());
    }

    #[test]
    fn html_ingester_keeps_raw_token() {
        let config = ImportConfig::new(ResourceType::Item)
            .with_multivalue_separator(";")
            .with_media_column(0, "html");
        let mapper = MediaMapper::from_config(&config);
        let datum = mapper.map_row(&row(&[" <p>hello</p> "]));
        assert_eq!(datum.media[0].source, "<p>hello</p>");
        assert_eq!(datum.media[0].html.as_deref(), Some(" <p>hello</p> "));
        assert!(datum.media[0].ingest_url.is_none());
    }

    #[test]
    fn other_ingesters_carry_only_source() {
        let config = ImportConfig::new(ResourceType::Item).with_media_column(0, "upload");
        let mapper = MediaMapper::from_config(&config);
        let datum = mapper.map_row(&row(&["scan.tiff"]));
        assert_eq!(datum.media[0].source, "scan.tiff");
        assert!(datum.media[0].html.is_none());
        assert!(datum.media[0].ingest_url.is_none());
    }

    #[test]
    fn empty_cell_emits_one_descriptor_by_default() {
        let config = ImportConfig::new(ResourceType::Item).with_media_column(0, "url");
        let mapper = MediaMapper::from_config(&config);
        let datum = mapper.map_row(&row(&[""]));
        assert_eq!(datum.media.len(), 1);
        assert_eq!(datum.media[0].source, "");
    }

    #[test]
    fn skip_policy_drops_empty_tokens() {
        let config = ImportConfig::new(ResourceType::Item)
            .with_media_column(0, "url")
            .with_empty_cells(EmptyCellPolicy::Skip);
        let mapper = MediaMapper::from_config(&config);
        assert!(mapper.map_row(&row(&[""])).media.is_empty());
    }

    #[test]
    fn unmapped_columns_are_ignored() {
        let config = ImportConfig::new(ResourceType::Item)
            .with_property_column(
                0,
                PropertyMapping::new(PropertyTerm::new("dcterms:title").unwrap()),
            )
            .with_media_column(1, "url");
        let mapper = MediaMapper::from_config(&config);
        let datum = mapper.map_row(&row(&["not media", "http://a"]));
        assert_eq!(datum.media.len(), 1);
        assert_eq!(datum.media[0].source, "http://a");
    }

    #[test]
    fn unknown_ingester_passes_through_opaquely() {
        let config = ImportConfig::new(ResourceType::Item).with_media_column(0, "sidecar");
        let mapper = MediaMapper::from_config(&config);
        let datum = mapper.map_row(&row(&["x"]));
        assert_eq!(datum.media[0].ingester, "sidecar");
    }
}
