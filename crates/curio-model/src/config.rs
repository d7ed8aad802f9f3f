//! Import configuration.
//!
//! One [`ImportConfig`] describes one job: which spreadsheet columns map to
//! which semantic target, how cells are split into multiple values, and what
//! the job does with each row (create, update under a merge policy, delete).
//! The configuration is validated once at load time and never mutated during
//! a run.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{ModelError, PropertyTerm, ResourceType, ValueKind};

/// Job-level action applied to every row (unless an action column overrides
/// it per row).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportAction {
    #[default]
    Create,
    Update,
    Delete,
}

impl ImportAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportAction::Create => "create",
            ImportAction::Update => "update",
            ImportAction::Delete => "delete",
        }
    }
}

impl fmt::Display for ImportAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportAction {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "create" => Ok(ImportAction::Create),
            "update" => Ok(ImportAction::Update),
            "delete" => Ok(ImportAction::Delete),
            _ => Err(ModelError::InvalidAction(value.to_string())),
        }
    }
}

/// Effective action for a single row, after the optional action column has
/// been consulted. `Skip` leaves the row (and any existing resource)
/// untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Skip,
    Create,
    Update,
    Delete,
}

impl RowAction {
    /// Parse an action-column cell. An empty cell means "use the job
    /// default" and yields `None`; an unrecognized token is an error the
    /// caller records as a row failure.
    pub fn from_cell(cell: &str) -> Result<Option<Self>, ModelError> {
        let token = cell.trim();
        if token.is_empty() {
            return Ok(None);
        }
        match token.to_ascii_lowercase().as_str() {
            "skip" => Ok(Some(RowAction::Skip)),
            "create" => Ok(Some(RowAction::Create)),
            "update" => Ok(Some(RowAction::Update)),
            "delete" => Ok(Some(RowAction::Delete)),
            _ => Err(ModelError::InvalidAction(token.to_string())),
        }
    }
}

impl From<ImportAction> for RowAction {
    fn from(action: ImportAction) -> Self {
        match action {
            ImportAction::Create => RowAction::Create,
            ImportAction::Update => RowAction::Update,
            ImportAction::Delete => RowAction::Delete,
        }
    }
}

/// How a freshly mapped payload combines with an existing resource during an
/// update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Leave the existing resource untouched.
    Skip,
    /// Add new list entries after the existing ones; fill scalars only when
    /// unset.
    Append,
    /// Remove existing list entries that match new payload entries.
    ReviseSubtract,
    /// Add new list entries only when not already present (idempotent).
    ReviseAdd,
    /// Non-empty new fields overwrite existing ones; absent fields are left
    /// untouched.
    #[default]
    Update,
    /// Mapped fields are replaced wholesale; fields outside the
    /// configuration's mappings are left untouched.
    Replace,
}

impl MergePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergePolicy::Skip => "skip",
            MergePolicy::Append => "append",
            MergePolicy::ReviseSubtract => "revise_subtract",
            MergePolicy::ReviseAdd => "revise_add",
            MergePolicy::Update => "update",
            MergePolicy::Replace => "replace",
        }
    }
}

impl fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MergePolicy {
    type Err = ModelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "skip" => Ok(MergePolicy::Skip),
            "append" => Ok(MergePolicy::Append),
            "revise_subtract" => Ok(MergePolicy::ReviseSubtract),
            "revise_add" => Ok(MergePolicy::ReviseAdd),
            "update" => Ok(MergePolicy::Update),
            "replace" => Ok(MergePolicy::Replace),
            _ => Err(ModelError::InvalidMergePolicy(value.to_string())),
        }
    }
}

/// Whether an empty multivalue token still produces a media descriptor.
///
/// Splitting an empty cell yields one empty token; the historical importer
/// emitted a descriptor for it. `Emit` preserves that behavior, `Skip` drops
/// empty tokens instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyCellPolicy {
    #[default]
    Emit,
    Skip,
}

/// How identifier-column values are matched against existing resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierMode {
    /// Match against a metadata property (see
    /// [`ImportConfig::identifier_property`]).
    #[default]
    Property,
    /// The cell holds the store's internal numeric id.
    InternalId,
}

/// Mapping of one property column: target term plus value interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyMapping {
    pub term: PropertyTerm,
    #[serde(default)]
    pub kind: ValueKind,
}

impl PropertyMapping {
    pub fn new(term: PropertyTerm) -> Self {
        Self {
            term,
            kind: ValueKind::Literal,
        }
    }

    pub fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }
}

/// Immutable options for one import job.
///
/// All recognized mapping names are enumerated here; unknown keys are
/// rejected at deserialization time rather than at row-processing time.
/// Column indices are zero-based positions in the tokenized row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Kind of resource each row creates or targets.
    pub resource_type: ResourceType,
    /// Job-level action; an action column may override it per row.
    pub action: ImportAction,
    /// Merge policy applied when a row updates an existing resource.
    pub merge_policy: MergePolicy,
    /// Field delimiter of the input file.
    pub delimiter: char,
    /// Separator splitting one cell into multiple logical values.
    pub multivalue_separator: String,
    /// Columns whose property cells are split on the multivalue separator.
    pub multivalue_columns: BTreeSet<usize>,
    /// Metadata property mappings, keyed by column index.
    pub properties: BTreeMap<usize, PropertyMapping>,
    /// Media mappings: column index to ingester name.
    pub media: BTreeMap<usize, String>,
    /// Columns holding item-set id assignments.
    pub item_sets: Vec<usize>,
    /// Columns holding the resource class term. More than one column is
    /// allowed; conflicting non-empty values resolve last-writer-wins with a
    /// logged warning.
    pub resource_class_columns: Vec<usize>,
    /// Columns holding the resource template name.
    pub resource_template_columns: Vec<usize>,
    /// Column identifying the target resource for updates and deletes.
    pub identifier_column: Option<usize>,
    /// How identifier values are matched.
    pub identifier_mode: IdentifierMode,
    /// Property the identifier is matched against in `Property` mode.
    pub identifier_property: Option<PropertyTerm>,
    /// Column carrying a per-row action override.
    pub action_column: Option<usize>,
    /// Treatment of empty multivalue tokens in media columns.
    pub empty_cells: EmptyCellPolicy,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            resource_type: ResourceType::Item,
            action: ImportAction::Create,
            merge_policy: MergePolicy::default(),
            delimiter: ',',
            multivalue_separator: ",".to_string(),
            multivalue_columns: BTreeSet::new(),
            properties: BTreeMap::new(),
            media: BTreeMap::new(),
            item_sets: Vec::new(),
            resource_class_columns: Vec::new(),
            resource_template_columns: Vec::new(),
            identifier_column: None,
            identifier_mode: IdentifierMode::default(),
            identifier_property: None,
            action_column: None,
            empty_cells: EmptyCellPolicy::default(),
        }
    }
}

impl ImportConfig {
    pub fn new(resource_type: ResourceType) -> Self {
        Self {
            resource_type,
            ..Self::default()
        }
    }

    pub fn with_action(mut self, action: ImportAction) -> Self {
        self.action = action;
        self
    }

    pub fn with_merge_policy(mut self, policy: MergePolicy) -> Self {
        self.merge_policy = policy;
        self
    }

    pub fn with_multivalue_separator(mut self, separator: impl Into<String>) -> Self {
        self.multivalue_separator = separator.into();
        self
    }

    /// Flag a property column as multivalued.
    pub fn with_multivalue_column(mut self, column: usize) -> Self {
        self.multivalue_columns.insert(column);
        self
    }

    pub fn with_property_column(mut self, column: usize, mapping: PropertyMapping) -> Self {
        self.properties.insert(column, mapping);
        self
    }

    pub fn with_media_column(mut self, column: usize, ingester: impl Into<String>) -> Self {
        self.media.insert(column, ingester.into());
        self
    }

    pub fn with_item_set_column(mut self, column: usize) -> Self {
        self.item_sets.push(column);
        self
    }

    pub fn with_resource_class_column(mut self, column: usize) -> Self {
        self.resource_class_columns.push(column);
        self
    }

    pub fn with_resource_template_column(mut self, column: usize) -> Self {
        self.resource_template_columns.push(column);
        self
    }

    pub fn with_identifier(mut self, column: usize, property: PropertyTerm) -> Self {
        self.identifier_column = Some(column);
        self.identifier_mode = IdentifierMode::Property;
        self.identifier_property = Some(property);
        self
    }

    pub fn with_internal_id_column(mut self, column: usize) -> Self {
        self.identifier_column = Some(column);
        self.identifier_mode = IdentifierMode::InternalId;
        self
    }

    pub fn with_action_column(mut self, column: usize) -> Self {
        self.action_column = Some(column);
        self
    }

    pub fn with_empty_cells(mut self, policy: EmptyCellPolicy) -> Self {
        self.empty_cells = policy;
        self
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.multivalue_separator.is_empty() {
            return Err(ModelError::InvalidConfig(
                "multivalue separator must not be empty".to_string(),
            ));
        }
        if matches!(self.action, ImportAction::Update | ImportAction::Delete)
            && self.identifier_column.is_none()
        {
            return Err(ModelError::InvalidConfig(format!(
                "action {} requires an identifier column",
                self.action
            )));
        }
        if self.identifier_column.is_some()
            && self.identifier_mode == IdentifierMode::Property
            && self.identifier_property.is_none()
        {
            return Err(ModelError::InvalidConfig(
                "identifier matching by property requires identifier_property".to_string(),
            ));
        }
        if let Some((column, _)) = self
            .media
            .iter()
            .find(|(_, ingester)| ingester.trim().is_empty())
        {
            return Err(ModelError::InvalidConfig(format!(
                "media column {column} has an empty ingester name"
            )));
        }
        Ok(())
    }
}
