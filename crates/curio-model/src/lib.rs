pub mod config;
pub mod error;
pub mod ids;
pub mod outcome;
pub mod resource;

pub use config::{
    EmptyCellPolicy, IdentifierMode, ImportAction, ImportConfig, MergePolicy, PropertyMapping,
    RowAction,
};
pub use error::{ModelError, Result};
pub use ids::{PropertyTerm, ResourceId};
pub use outcome::{FailureKind, ImportReport, ImportSummary, RowFailure, RowOutcome, RowResult};
pub use resource::{MediaDescriptor, PropertyValue, ResourcePayload, ResourceType, ValueKind};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_round_trips_through_json() {
        let config = ImportConfig::new(ResourceType::Item)
            .with_multivalue_separator(";")
            .with_property_column(0, PropertyMapping::new(PropertyTerm::new("dcterms:title").unwrap()))
            .with_media_column(2, "url")
            .with_identifier(1, PropertyTerm::new("dcterms:identifier").unwrap());
        let json = serde_json::to_string(&config).expect("serialize config");
        let round: ImportConfig = serde_json::from_str(&json).expect("deserialize config");
        assert_eq!(round, config);
    }

    #[test]
    fn payload_round_trips_through_json() {
        let mut payload = ResourcePayload::new();
        payload.push_property(
            PropertyTerm::new("dcterms:title").unwrap(),
            PropertyValue::literal("A Register of Deeds"),
        );
        payload.media.push(MediaDescriptor::new("url", "http://example.org/scan.jpg"));
        payload.item_sets.push(ResourceId::new(7));
        let json = serde_json::to_string(&payload).expect("serialize payload");
        let round: ResourcePayload = serde_json::from_str(&json).expect("deserialize payload");
        assert_eq!(round, payload);
    }
}
