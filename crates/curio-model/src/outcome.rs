//! Per-row outcomes and the job-level summary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ResourceId;

/// Why a row failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The identifier matched no existing resource.
    IdentifierNotFound,
    /// The identifier matched more than one existing resource.
    IdentifierAmbiguous,
    /// The action-column cell held an unrecognized token.
    InvalidAction,
    /// The store rejected the row's payload (bad ingester name, constraint
    /// violation, and so on).
    StoreRejected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::IdentifierNotFound => "identifier_not_found",
            FailureKind::IdentifierAmbiguous => "identifier_ambiguous",
            FailureKind::InvalidAction => "invalid_action",
            FailureKind::StoreRejected => "store_rejected",
        }
    }
}

/// A recorded row failure: the kind plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl RowFailure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Result of processing one row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowResult {
    Created { id: ResourceId },
    Updated { id: ResourceId },
    Deleted { id: ResourceId },
    Skipped,
    Failed { failure: RowFailure },
}

impl RowResult {
    pub fn failed(kind: FailureKind, message: impl Into<String>) -> Self {
        RowResult::Failed {
            failure: RowFailure::new(kind, message),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, RowResult::Failed { .. })
    }
}

/// Outcome of one row, tagged with its 1-based data row number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowOutcome {
    pub row: usize,
    pub result: RowResult,
}

/// Aggregate counts across a whole job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    /// True when a fatal store error stopped the job before the last row.
    pub aborted: bool,
    /// True when a cancellation signal stopped the job between rows.
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl ImportSummary {
    pub fn started_now() -> Self {
        Self {
            created: 0,
            updated: 0,
            deleted: 0,
            skipped: 0,
            failed: 0,
            aborted: false,
            cancelled: false,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, result: &RowResult) {
        match result {
            RowResult::Created { .. } => self.created += 1,
            RowResult::Updated { .. } => self.updated += 1,
            RowResult::Deleted { .. } => self.deleted += 1,
            RowResult::Skipped => self.skipped += 1,
            RowResult::Failed { .. } => self.failed += 1,
        }
    }

    /// Total number of rows that reached an outcome.
    pub fn processed(&self) -> usize {
        self.created + self.updated + self.deleted + self.skipped + self.failed
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }
}

/// Summary plus the ordered per-row outcomes of one job run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportReport {
    pub summary: ImportSummary,
    pub outcomes: Vec<RowOutcome>,
}
