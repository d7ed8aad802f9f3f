//! In-memory reference store.
//!
//! Backs the integration tests and doubles as an executable description of
//! the store contract: sequential id assignment, ingester validation on
//! create, exact-value property search, and a switchable connection failure
//! for exercising the fatal-error path.

use std::collections::{BTreeMap, BTreeSet};

use curio_model::{ResourceId, ResourcePayload, ResourceType};

use super::{ResourceStore, SearchFilter, StoreError, StoredResource};

/// BTreeMap-backed [`ResourceStore`] implementation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    resources: BTreeMap<ResourceType, BTreeMap<ResourceId, ResourcePayload>>,
    known_ingesters: BTreeSet<String>,
    next_id: u64,
    connection_down: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            resources: BTreeMap::new(),
            known_ingesters: ["upload", "url", "html"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            next_id: 0,
            connection_down: false,
        }
    }

    /// Register an additional ingester name the store accepts.
    pub fn with_ingester(mut self, name: impl Into<String>) -> Self {
        self.known_ingesters.insert(name.into());
        self
    }

    /// Simulate the store becoming unreachable.
    pub fn set_connection_down(&mut self, down: bool) {
        self.connection_down = down;
    }

    /// Number of stored resources of a type.
    pub fn count(&self, resource_type: ResourceType) -> usize {
        self.resources
            .get(&resource_type)
            .map_or(0, BTreeMap::len)
    }

    /// Direct payload access for assertions.
    pub fn get(&self, resource_type: ResourceType, id: ResourceId) -> Option<&ResourcePayload> {
        self.resources.get(&resource_type)?.get(&id)
    }

    /// Seed a resource with a fixed id, for tests that need known state.
    pub fn insert(&mut self, resource_type: ResourceType, id: ResourceId, payload: ResourcePayload) {
        self.next_id = self.next_id.max(id.value());
        self.resources
            .entry(resource_type)
            .or_default()
            .insert(id, payload);
    }

    fn check_connection(&self) -> Result<(), StoreError> {
        if self.connection_down {
            Err(StoreError::Connection("connection refused".to_string()))
        } else {
            Ok(())
        }
    }

    fn check_ingesters(
        &self,
        resource_type: ResourceType,
        payload: &ResourcePayload,
    ) -> Result<(), StoreError> {
        for media in &payload.media {
            if !self.known_ingesters.contains(&media.ingester) {
                return Err(StoreError::Rejected {
                    resource_type,
                    message: format!("unknown ingester {:?}", media.ingester),
                });
            }
        }
        Ok(())
    }
}

impl ResourceStore for MemoryStore {
    fn create(
        &mut self,
        resource_type: ResourceType,
        payload: &ResourcePayload,
    ) -> Result<ResourceId, StoreError> {
        self.check_connection()?;
        self.check_ingesters(resource_type, payload)?;
        self.next_id += 1;
        let id = ResourceId::new(self.next_id);
        self.resources
            .entry(resource_type)
            .or_default()
            .insert(id, payload.clone());
        Ok(id)
    }

    fn update(
        &mut self,
        resource_type: ResourceType,
        id: ResourceId,
        payload: &ResourcePayload,
    ) -> Result<(), StoreError> {
        self.check_connection()?;
        self.check_ingesters(resource_type, payload)?;
        let slot = self
            .resources
            .get_mut(&resource_type)
            .and_then(|map| map.get_mut(&id))
            .ok_or(StoreError::NotFound { resource_type, id })?;
        *slot = payload.clone();
        Ok(())
    }

    fn delete(&mut self, resource_type: ResourceType, id: ResourceId) -> Result<(), StoreError> {
        self.check_connection()?;
        self.resources
            .get_mut(&resource_type)
            .and_then(|map| map.remove(&id))
            .ok_or(StoreError::NotFound { resource_type, id })?;
        Ok(())
    }

    fn search(
        &self,
        resource_type: ResourceType,
        filter: &SearchFilter,
    ) -> Result<Vec<StoredResource>, StoreError> {
        self.check_connection()?;
        let Some(resources) = self.resources.get(&resource_type) else {
            return Ok(Vec::new());
        };
        let matches = match filter {
            SearchFilter::InternalId(id) => resources
                .get(id)
                .map(|payload| StoredResource {
                    id: *id,
                    payload: payload.clone(),
                })
                .into_iter()
                .collect(),
            SearchFilter::Property { term, value } => resources
                .iter()
                .filter(|(_, payload)| {
                    payload
                        .properties
                        .get(term)
                        .is_some_and(|values| values.iter().any(|v| &v.value == value))
                })
                .map(|(id, payload)| StoredResource {
                    id: *id,
                    payload: payload.clone(),
                })
                .collect(),
        };
        Ok(matches)
    }
}
