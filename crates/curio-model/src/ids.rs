#![deny(unsafe_code)]

use std::fmt;

use crate::ModelError;

/// A property term in `vocabulary:local_name` form, e.g. `dcterms:title`.
///
/// Terms are trimmed on construction and must be non-empty. No vocabulary
/// lookup happens here; unknown terms are rejected by the store, not by the
/// model.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(transparent)]
pub struct PropertyTerm(String);

impl PropertyTerm {
    pub fn new(value: impl Into<String>) -> Result<Self, ModelError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ModelError::InvalidPropertyTerm(value));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PropertyTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Internal identifier of a stored resource.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(transparent)]
pub struct ResourceId(u64);

impl ResourceId {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ResourceId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn property_term_trims_and_rejects_empty() {
        let term = PropertyTerm::new("  dcterms:title ").unwrap();
        assert_eq!(term.as_str(), "dcterms:title");
        assert!(PropertyTerm::new("   ").is_err());
    }

    #[test]
    fn resource_id_displays_as_number() {
        assert_eq!(ResourceId::new(42).to_string(), "42");
    }
}
