//! The resource store collaborator.
//!
//! The import engine never talks to a persistence layer directly; it drives
//! an implementation of [`ResourceStore`]. Store calls are synchronous and
//! issued one at a time, in row order. Errors distinguish row-level
//! rejections (the job records the failure and continues) from
//! connection-level failures (the job aborts its remaining rows).

pub mod memory;

use thiserror::Error;

use curio_model::{PropertyTerm, ResourceId, ResourcePayload, ResourceType};

/// Errors returned by store calls.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the payload (unknown ingester name, constraint
    /// violation, ...). Row-level: the job continues.
    #[error("store rejected {resource_type}: {message}")]
    Rejected {
        resource_type: ResourceType,
        message: String,
    },
    /// The targeted resource does not exist. Row-level.
    #[error("{resource_type} {id} not found")]
    NotFound {
        resource_type: ResourceType,
        id: ResourceId,
    },
    /// The store itself is unreachable. Fatal: the job aborts.
    #[error("store connection failed: {0}")]
    Connection(String),
}

impl StoreError {
    /// Fatal errors abort the whole job; everything else fails one row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

/// Filter used to resolve identifier-column values to existing resources.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchFilter {
    /// Match resources carrying the given value on a metadata property.
    Property { term: PropertyTerm, value: String },
    /// Match the store's internal id directly.
    InternalId(ResourceId),
}

/// An existing resource returned by a search.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredResource {
    pub id: ResourceId,
    pub payload: ResourcePayload,
}

/// Synchronous CRUD-plus-search surface of the target repository.
pub trait ResourceStore {
    fn create(
        &mut self,
        resource_type: ResourceType,
        payload: &ResourcePayload,
    ) -> Result<ResourceId, StoreError>;

    fn update(
        &mut self,
        resource_type: ResourceType,
        id: ResourceId,
        payload: &ResourcePayload,
    ) -> Result<(), StoreError>;

    fn delete(&mut self, resource_type: ResourceType, id: ResourceId) -> Result<(), StoreError>;

    fn search(
        &self,
        resource_type: ResourceType,
        filter: &SearchFilter,
    ) -> Result<Vec<StoredResource>, StoreError>;
}
