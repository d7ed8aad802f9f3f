//! The import job orchestrator.
//!
//! Drives a whole file through the pipeline: tokenize, build a payload per
//! row, resolve the target for updates and deletes, apply the store call,
//! and record the outcome. Rows are processed strictly in file order with
//! one synchronous store call at a time, because later rows may depend on
//! resources earlier rows created. A row failure is logged and the job
//! continues; only a connection-level store error aborts the remaining
//! rows. Cancellation is cooperative and checked between rows.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Context;

use curio_ingest::{RowSet, read_rows};
use curio_map::PayloadBuilder;
use curio_model::{
    FailureKind, ImportConfig, ImportReport, ImportSummary, ModelError, RowAction, RowOutcome,
    RowResult,
};

use crate::resolver::{self, MappedScope, Resolution};
use crate::store::{ResourceStore, StoreError};

/// Receives each row outcome as soon as it is recorded. The host uses this
/// to surface progress; the default implementation ignores everything.
pub trait ProgressObserver {
    fn on_row(&mut self, outcome: &RowOutcome) {
        let _ = outcome;
    }
}

/// Observer that discards all progress events.
#[derive(Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {}

/// Shared cooperative cancellation signal.
///
/// Cloning the flag shares the underlying signal; the host keeps one clone
/// and cancels from wherever it likes. The job checks between rows and
/// stops issuing store calls once the flag is set.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// One import = one job. Construction validates the configuration; the job
/// itself holds no mutable state across rows beyond the running summary.
#[derive(Debug)]
pub struct ImportJob {
    config: ImportConfig,
    builder: PayloadBuilder,
    scope: MappedScope,
    cancel: CancelFlag,
}

impl ImportJob {
    pub fn new(config: ImportConfig) -> Result<Self, ModelError> {
        config.validate()?;
        let builder = PayloadBuilder::from_config(&config);
        let scope = MappedScope::from_config(&config);
        Ok(Self {
            config,
            builder,
            scope,
            cancel: CancelFlag::new(),
        })
    }

    /// A clone of the job's cancellation flag, for the host to keep.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    /// Process every row in file order and report the outcomes.
    pub fn run<S, O>(&self, rows: &RowSet, store: &mut S, observer: &mut O) -> ImportReport
    where
        S: ResourceStore + ?Sized,
        O: ProgressObserver + ?Sized,
    {
        let mut summary = ImportSummary::started_now();
        let mut outcomes = Vec::with_capacity(rows.rows.len());

        tracing::info!(
            rows = rows.rows.len(),
            resource_type = %self.config.resource_type,
            action = %self.config.action,
            "starting import"
        );

        for (number, row) in rows.numbered_rows() {
            if self.cancel.is_cancelled() {
                tracing::info!(processed = summary.processed(), "import cancelled");
                summary.cancelled = true;
                break;
            }

            let (result, fatal) = match self.process_row(row, store) {
                Ok(result) => (result, false),
                Err(error) => (
                    RowResult::failed(FailureKind::StoreRejected, error.to_string()),
                    true,
                ),
            };

            if let RowResult::Failed { failure } = &result {
                tracing::warn!(
                    row = number,
                    kind = failure.kind.as_str(),
                    message = %failure.message,
                    "row failed"
                );
            }

            summary.record(&result);
            let outcome = RowOutcome {
                row: number,
                result,
            };
            observer.on_row(&outcome);
            outcomes.push(outcome);

            if fatal {
                tracing::error!(row = number, "store connection failed; aborting remaining rows");
                summary.aborted = true;
                break;
            }
        }

        summary.finish();
        tracing::info!(
            created = summary.created,
            updated = summary.updated,
            deleted = summary.deleted,
            skipped = summary.skipped,
            failed = summary.failed,
            "import finished"
        );
        ImportReport { summary, outcomes }
    }

    /// Apply one row. `Err` means a fatal store error; every row-level
    /// problem comes back as a failed [`RowResult`] instead.
    fn process_row<S>(&self, row: &[String], store: &mut S) -> Result<RowResult, StoreError>
    where
        S: ResourceStore + ?Sized,
    {
        let action = match self.builder.registry().row_action(row) {
            Ok(Some(action)) => action,
            Ok(None) => RowAction::from(self.config.action),
            Err(error) => {
                return Ok(RowResult::failed(
                    FailureKind::InvalidAction,
                    error.to_string(),
                ));
            }
        };

        match action {
            RowAction::Skip => Ok(RowResult::Skipped),
            RowAction::Create => self.create_row(row, store),
            RowAction::Update => self.update_row(row, store),
            RowAction::Delete => self.delete_row(row, store),
        }
    }

    fn create_row<S>(&self, row: &[String], store: &mut S) -> Result<RowResult, StoreError>
    where
        S: ResourceStore + ?Sized,
    {
        let payload = self.builder.build_row(row);
        match store.create(self.config.resource_type, &payload) {
            Ok(id) => Ok(RowResult::Created { id }),
            Err(error) => row_failure_or_fatal(error),
        }
    }

    fn update_row<S>(&self, row: &[String], store: &mut S) -> Result<RowResult, StoreError>
    where
        S: ResourceStore + ?Sized,
    {
        let existing = match self.resolve_row(row, store)? {
            Ok(resource) => resource,
            Err(result) => return Ok(result),
        };
        let fresh = self.builder.build_row(row);
        let Some(merged) =
            resolver::apply_merge(self.config.merge_policy, &existing.payload, &fresh, &self.scope)
        else {
            // Skip policy: the existing resource stays untouched and no
            // store call is made.
            return Ok(RowResult::Skipped);
        };
        match store.update(self.config.resource_type, existing.id, &merged) {
            Ok(()) => Ok(RowResult::Updated { id: existing.id }),
            Err(error) => row_failure_or_fatal(error),
        }
    }

    fn delete_row<S>(&self, row: &[String], store: &mut S) -> Result<RowResult, StoreError>
    where
        S: ResourceStore + ?Sized,
    {
        let existing = match self.resolve_row(row, store)? {
            Ok(resource) => resource,
            Err(result) => return Ok(result),
        };
        match store.delete(self.config.resource_type, existing.id) {
            Ok(()) => Ok(RowResult::Deleted { id: existing.id }),
            Err(error) => row_failure_or_fatal(error),
        }
    }

    /// Resolve the row's identifier to exactly one existing resource.
    ///
    /// The inner `Err` carries a ready-made failed result for this row.
    fn resolve_row<S>(
        &self,
        row: &[String],
        store: &mut S,
    ) -> Result<Result<crate::store::StoredResource, RowResult>, StoreError>
    where
        S: ResourceStore + ?Sized,
    {
        let Some(identifier) = self.builder.registry().identifier_cell(row) else {
            return Ok(Err(RowResult::failed(
                FailureKind::IdentifierNotFound,
                "row has no identifier value",
            )));
        };
        match resolver::resolve_target(store, &self.config, identifier) {
            Ok(Resolution::Match(resource)) => Ok(Ok(resource)),
            Ok(Resolution::Failed(failure)) => Ok(Err(RowResult::Failed { failure })),
            Err(error) if error.is_fatal() => Err(error),
            Err(error) => Ok(Err(RowResult::failed(
                FailureKind::StoreRejected,
                error.to_string(),
            ))),
        }
    }
}

fn row_failure_or_fatal(error: StoreError) -> Result<RowResult, StoreError> {
    if error.is_fatal() {
        Err(error)
    } else {
        Ok(RowResult::failed(
            FailureKind::StoreRejected,
            error.to_string(),
        ))
    }
}

/// Validate the configuration and run one import over already-tokenized
/// rows.
pub fn run_import<S>(
    config: ImportConfig,
    rows: &RowSet,
    store: &mut S,
) -> anyhow::Result<ImportReport>
where
    S: ResourceStore + ?Sized,
{
    let job = ImportJob::new(config).context("invalid import configuration")?;
    Ok(job.run(rows, store, &mut NoProgress))
}

/// Tokenize a delimited-text file and run one import over it.
pub fn run_import_file<S>(
    config: ImportConfig,
    path: &Path,
    store: &mut S,
) -> anyhow::Result<ImportReport>
where
    S: ResourceStore + ?Sized,
{
    let delimiter = delimiter_byte(config.delimiter)?;
    let rows =
        read_rows(path, delimiter).with_context(|| format!("tokenize {}", path.display()))?;
    run_import(config, &rows, store)
}

fn delimiter_byte(delimiter: char) -> anyhow::Result<u8> {
    u8::try_from(u32::from(delimiter))
        .ok()
        .filter(u8::is_ascii)
        .context("field delimiter must be a single ASCII character")
}
