//! Identifier resolution and update merging.
//!
//! When a row updates or deletes, its identifier cell is resolved against
//! the store; exactly one match is required. For updates, the configured
//! merge policy decides how the freshly mapped payload combines with the
//! existing resource. Every policy is scoped to the fields the
//! configuration actually maps, so a replace never clobbers data the import
//! file says nothing about.

use std::collections::BTreeSet;

use curio_model::{
    FailureKind, IdentifierMode, ImportConfig, MergePolicy, PropertyTerm, ResourceId,
    ResourcePayload, RowFailure,
};

use crate::store::{ResourceStore, SearchFilter, StoreError, StoredResource};

/// Result of resolving one identifier value: a single match, or a row
/// failure the orchestrator records. Store errors propagate separately so
/// fatal ones can abort the job.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Match(StoredResource),
    Failed(RowFailure),
}

/// Resolve an identifier-column value to exactly one existing resource.
pub fn resolve_target<S: ResourceStore + ?Sized>(
    store: &S,
    config: &ImportConfig,
    identifier: &str,
) -> Result<Resolution, StoreError> {
    let filter = match config.identifier_mode {
        IdentifierMode::InternalId => match identifier.parse::<u64>() {
            Ok(id) => SearchFilter::InternalId(ResourceId::new(id)),
            Err(_) => {
                return Ok(Resolution::Failed(RowFailure::new(
                    FailureKind::IdentifierNotFound,
                    format!("identifier {identifier:?} is not a numeric id"),
                )));
            }
        },
        IdentifierMode::Property => {
            // Validation guarantees the property is present in this mode.
            let Some(term) = config.identifier_property.clone() else {
                return Ok(Resolution::Failed(RowFailure::new(
                    FailureKind::IdentifierNotFound,
                    "no identifier property configured".to_string(),
                )));
            };
            SearchFilter::Property {
                term,
                value: identifier.to_string(),
            }
        }
    };

    let mut matches = store.search(config.resource_type, &filter)?;
    match matches.len() {
        1 => Ok(Resolution::Match(matches.remove(0))),
        0 => Ok(Resolution::Failed(RowFailure::new(
            FailureKind::IdentifierNotFound,
            format!("no {} matches identifier {identifier:?}", config.resource_type),
        ))),
        n => Ok(Resolution::Failed(RowFailure::new(
            FailureKind::IdentifierAmbiguous,
            format!(
                "{n} {} resources match identifier {identifier:?}",
                config.resource_type
            ),
        ))),
    }
}

/// The payload fields a configuration maps. Merge policies never touch
/// anything outside this scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappedScope {
    pub properties: BTreeSet<PropertyTerm>,
    pub media: bool,
    pub item_sets: bool,
    pub resource_class: bool,
    pub resource_template: bool,
}

impl MappedScope {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            properties: config
                .properties
                .values()
                .map(|mapping| mapping.term.clone())
                .collect(),
            media: !config.media.is_empty(),
            item_sets: !config.item_sets.is_empty(),
            resource_class: !config.resource_class_columns.is_empty(),
            resource_template: !config.resource_template_columns.is_empty(),
        }
    }
}

/// Apply a merge policy to an existing resource and a freshly built payload.
///
/// Returns the full payload to send to the store, or `None` when no store
/// call should be made at all (the `Skip` policy).
pub fn apply_merge(
    policy: MergePolicy,
    existing: &ResourcePayload,
    fresh: &ResourcePayload,
    scope: &MappedScope,
) -> Option<ResourcePayload> {
    match policy {
        MergePolicy::Skip => None,
        MergePolicy::Append => Some(append(existing, fresh)),
        MergePolicy::ReviseSubtract => Some(revise_subtract(existing, fresh)),
        MergePolicy::ReviseAdd => Some(revise_add(existing, fresh)),
        MergePolicy::Update => Some(overwrite_non_empty(existing, fresh)),
        MergePolicy::Replace => Some(replace_scoped(existing, fresh, scope)),
    }
}

/// New list entries go after the existing ones; scalars fill only when
/// unset.
fn append(existing: &ResourcePayload, fresh: &ResourcePayload) -> ResourcePayload {
    let mut result = existing.clone();
    for (term, values) in &fresh.properties {
        result
            .properties
            .entry(term.clone())
            .or_default()
            .extend(values.iter().cloned());
    }
    result.media.extend(fresh.media.iter().cloned());
    for id in &fresh.item_sets {
        if !result.item_sets.contains(id) {
            result.item_sets.push(*id);
        }
    }
    if result.resource_class.is_none() {
        result.resource_class = fresh.resource_class.clone();
    }
    if result.resource_template.is_none() {
        result.resource_template = fresh.resource_template.clone();
    }
    result
}

/// Existing entries matching fresh entries are removed; a scalar is cleared
/// only on exact match.
fn revise_subtract(existing: &ResourcePayload, fresh: &ResourcePayload) -> ResourcePayload {
    let mut result = existing.clone();
    for (term, values) in &fresh.properties {
        if let Some(slot) = result.properties.get_mut(term) {
            slot.retain(|value| !values.contains(value));
            if slot.is_empty() {
                result.properties.remove(term);
            }
        }
    }
    result
        .media
        .retain(|descriptor| !fresh.media.contains(descriptor));
    result.item_sets.retain(|id| !fresh.item_sets.contains(id));
    if result.resource_class == fresh.resource_class {
        result.resource_class = None;
    }
    if result.resource_template == fresh.resource_template {
        result.resource_template = None;
    }
    result
}

/// Fresh entries are added only when not already present, so repeating the
/// run changes nothing.
fn revise_add(existing: &ResourcePayload, fresh: &ResourcePayload) -> ResourcePayload {
    let mut result = existing.clone();
    for (term, values) in &fresh.properties {
        let slot = result.properties.entry(term.clone()).or_default();
        for value in values {
            if !slot.contains(value) {
                slot.push(value.clone());
            }
        }
    }
    for descriptor in &fresh.media {
        if !result.media.contains(descriptor) {
            result.media.push(descriptor.clone());
        }
    }
    for id in &fresh.item_sets {
        if !result.item_sets.contains(id) {
            result.item_sets.push(*id);
        }
    }
    if result.resource_class.is_none() {
        result.resource_class = fresh.resource_class.clone();
    }
    if result.resource_template.is_none() {
        result.resource_template = fresh.resource_template.clone();
    }
    result
}

/// Non-empty fresh fields overwrite; absent fields stay as they were.
fn overwrite_non_empty(existing: &ResourcePayload, fresh: &ResourcePayload) -> ResourcePayload {
    let mut result = existing.clone();
    for (term, values) in &fresh.properties {
        if !values.is_empty() {
            result.properties.insert(term.clone(), values.clone());
        }
    }
    if !fresh.media.is_empty() {
        result.media = fresh.media.clone();
    }
    if !fresh.item_sets.is_empty() {
        result.item_sets = fresh.item_sets.clone();
    }
    if fresh.resource_class.is_some() {
        result.resource_class = fresh.resource_class.clone();
    }
    if fresh.resource_template.is_some() {
        result.resource_template = fresh.resource_template.clone();
    }
    result
}

/// Every mapped field is replaced by the fresh value, including with
/// emptiness; fields outside the scope are untouched.
fn replace_scoped(
    existing: &ResourcePayload,
    fresh: &ResourcePayload,
    scope: &MappedScope,
) -> ResourcePayload {
    let mut result = existing.clone();
    for term in &scope.properties {
        match fresh.properties.get(term) {
            Some(values) if !values.is_empty() => {
                result.properties.insert(term.clone(), values.clone());
            }
            _ => {
                result.properties.remove(term);
            }
        }
    }
    if scope.media {
        result.media = fresh.media.clone();
    }
    if scope.item_sets {
        result.item_sets = fresh.item_sets.clone();
    }
    if scope.resource_class {
        result.resource_class = fresh.resource_class.clone();
    }
    if scope.resource_template {
        result.resource_template = fresh.resource_template.clone();
    }
    result
}
