//! End-to-end import job tests against the in-memory store.

use curio_core::{
    ImportJob, MemoryStore, ProgressObserver, ResourceStore, SearchFilter, StoreError,
    StoredResource, run_import,
};
use curio_ingest::{RowSet, read_rows_from_reader};
use curio_model::{
    FailureKind, ImportAction, ImportConfig, MergePolicy, PropertyMapping, PropertyTerm,
    ResourceId, ResourcePayload, ResourceType, RowOutcome, RowResult,
};

fn term(name: &str) -> PropertyTerm {
    PropertyTerm::new(name).unwrap()
}

fn rows(csv: &str) -> RowSet {
    read_rows_from_reader(csv.as_bytes(), b',').expect("tokenize")
}

/// Store wrapper counting calls, so tests can assert which calls a policy
/// issues (or avoids).
#[derive(Debug, Default)]
struct RecordingStore {
    inner: MemoryStore,
    creates: usize,
    updates: usize,
    deletes: usize,
}

impl RecordingStore {
    fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            creates: 0,
            updates: 0,
            deletes: 0,
        }
    }
}

impl ResourceStore for RecordingStore {
    fn create(
        &mut self,
        resource_type: ResourceType,
        payload: &ResourcePayload,
    ) -> Result<ResourceId, StoreError> {
        self.creates += 1;
        self.inner.create(resource_type, payload)
    }

    fn update(
        &mut self,
        resource_type: ResourceType,
        id: ResourceId,
        payload: &ResourcePayload,
    ) -> Result<(), StoreError> {
        self.updates += 1;
        self.inner.update(resource_type, id, payload)
    }

    fn delete(&mut self, resource_type: ResourceType, id: ResourceId) -> Result<(), StoreError> {
        self.deletes += 1;
        self.inner.delete(resource_type, id)
    }

    fn search(
        &self,
        resource_type: ResourceType,
        filter: &SearchFilter,
    ) -> Result<Vec<StoredResource>, StoreError> {
        self.inner.search(resource_type, filter)
    }
}

/// Columns: Identifier,Title,Files. The identifier doubles as a mapped
/// property so created resources can be found again.
fn create_config() -> ImportConfig {
    ImportConfig::new(ResourceType::Item)
        .with_multivalue_separator(";")
        .with_identifier(0, term("dcterms:identifier"))
        .with_property_column(0, PropertyMapping::new(term("dcterms:identifier")))
        .with_property_column(1, PropertyMapping::new(term("dcterms:title")))
        .with_media_column(2, "url")
}

const CREATE_CSV: &str = "Identifier,Title,Files\n\
                          row-1,First,http://a;http://b\n\
                          row-2,Second,\n\
                          row-3,Third,http://c\n";

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("seed import");
    store
}

fn find_by_identifier(store: &MemoryStore, value: &str) -> StoredResource {
    let filter = SearchFilter::Property {
        term: term("dcterms:identifier"),
        value: value.to_string(),
    };
    let mut matches = store.search(ResourceType::Item, &filter).expect("search");
    assert_eq!(matches.len(), 1, "expected exactly one match for {value}");
    matches.remove(0)
}

// ============================================================================
// Create
// ============================================================================

#[test]
fn create_imports_every_row() {
    let mut store = MemoryStore::new();
    let report = run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("run");
    assert_eq!(report.summary.created, 3);
    assert_eq!(report.summary.failed, 0);
    assert!(!report.summary.aborted);
    assert_eq!(store.count(ResourceType::Item), 3);

    // The multivalue media cell became two url descriptors.
    let first = find_by_identifier(&store, "row-1");
    assert_eq!(first.payload.media.len(), 2);
    assert_eq!(first.payload.media[0].source, "http://a");
    assert_eq!(first.payload.media[1].source, "http://b");
    assert!(first.payload.media.iter().all(|media| media.ingester == "url"));
}

#[test]
fn outcomes_arrive_in_file_order() {
    let mut store = MemoryStore::new();
    let report = run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("run");
    let numbers: Vec<usize> = report.outcomes.iter().map(|outcome| outcome.row).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn unknown_ingester_fails_only_its_row() {
    let csv = "Identifier,Title,Good,Bad\n\
               row-1,First,http://a,\n\
               row-2,Second,,broken\n";
    let config = ImportConfig::new(ResourceType::Item)
        .with_property_column(1, PropertyMapping::new(term("dcterms:title")))
        .with_media_column(2, "url")
        .with_media_column(3, "sideload");
    // Row 1 maps an empty Bad cell to an empty sideload descriptor too, so
    // make empty tokens skippable for this scenario.
    let config = config.with_empty_cells(curio_model::EmptyCellPolicy::Skip);
    let mut store = MemoryStore::new();
    let report = run_import(config, &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.created, 1);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(store.count(ResourceType::Item), 1);
    match &report.outcomes[1].result {
        RowResult::Failed { failure } => {
            assert_eq!(failure.kind, FailureKind::StoreRejected);
            assert!(failure.message.contains("sideload"));
        }
        other => panic!("expected a store rejection, got {other:?}"),
    }
}

// ============================================================================
// Update policies
// ============================================================================

fn update_config(policy: MergePolicy) -> ImportConfig {
    ImportConfig::new(ResourceType::Item)
        .with_action(ImportAction::Update)
        .with_merge_policy(policy)
        .with_identifier(0, term("dcterms:identifier"))
        .with_property_column(1, PropertyMapping::new(term("dcterms:title")))
}

#[test]
fn skip_policy_never_issues_an_update_call() {
    let mut store = RecordingStore::new();
    run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("seed");
    assert_eq!(store.creates, 3);

    let csv = "Identifier,Title\nrow-1,Renamed\n";
    let report = run_import(update_config(MergePolicy::Skip), &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(store.updates, 0);

    let existing = find_by_identifier(&store.inner, "row-1");
    let titles = &existing.payload.properties[&term("dcterms:title")];
    assert_eq!(titles[0].value, "First");
}

#[test]
fn append_policy_adds_a_second_title() {
    let mut store = seeded_store();
    let csv = "Identifier,Title\nrow-1,Also Known As\n";
    let report =
        run_import(update_config(MergePolicy::Append), &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.updated, 1);

    let existing = find_by_identifier(&store, "row-1");
    let titles: Vec<&str> = existing.payload.properties[&term("dcterms:title")]
        .iter()
        .map(|value| value.value.as_str())
        .collect();
    assert_eq!(titles, vec!["First", "Also Known As"]);
}

#[test]
fn revise_add_twice_changes_nothing_the_second_time() {
    let mut store = seeded_store();
    let csv = "Identifier,Title\nrow-1,First\n";
    let config = update_config(MergePolicy::ReviseAdd);

    run_import(config.clone(), &rows(csv), &mut store).expect("first run");
    let after_first = find_by_identifier(&store, "row-1").payload;

    run_import(config, &rows(csv), &mut store).expect("second run");
    let after_second = find_by_identifier(&store, "row-1").payload;
    assert_eq!(after_first, after_second);

    let titles = &after_second.properties[&term("dcterms:title")];
    assert_eq!(titles.len(), 1);
}

#[test]
fn replace_policy_leaves_unmapped_fields_alone() {
    let mut store = seeded_store();
    // The update maps only the title; identifiers and media of row-1 must
    // survive the replace.
    let csv = "Identifier,Title\nrow-1,Replacement\n";
    let report =
        run_import(update_config(MergePolicy::Replace), &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.updated, 1);

    let existing = find_by_identifier(&store, "row-1");
    let titles: Vec<&str> = existing.payload.properties[&term("dcterms:title")]
        .iter()
        .map(|value| value.value.as_str())
        .collect();
    assert_eq!(titles, vec!["Replacement"]);
    assert_eq!(existing.payload.media.len(), 2);
    assert!(
        existing
            .payload
            .properties
            .contains_key(&term("dcterms:identifier"))
    );
}

#[test]
fn update_of_an_unknown_identifier_fails_that_row() {
    let mut store = seeded_store();
    let csv = "Identifier,Title\nghost,Nope\nrow-2,Still Works\n";
    let report =
        run_import(update_config(MergePolicy::Update), &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.updated, 1);
    match &report.outcomes[0].result {
        RowResult::Failed { failure } => {
            assert_eq!(failure.kind, FailureKind::IdentifierNotFound);
        }
        other => panic!("expected identifier failure, got {other:?}"),
    }
}

#[test]
fn ambiguous_identifier_fails_that_row() {
    let mut store = MemoryStore::new();
    let csv = "Identifier,Title\ndup,One\ndup,Two\n";
    run_import(create_config(), &rows(csv), &mut store).expect("seed duplicates");

    let update_csv = "Identifier,Title\ndup,Renamed\n";
    let report = run_import(update_config(MergePolicy::Update), &rows(update_csv), &mut store)
        .expect("run");
    assert_eq!(report.summary.failed, 1);
    match &report.outcomes[0].result {
        RowResult::Failed { failure } => {
            assert_eq!(failure.kind, FailureKind::IdentifierAmbiguous);
        }
        other => panic!("expected ambiguity failure, got {other:?}"),
    }
}

// ============================================================================
// Delete
// ============================================================================

fn delete_config() -> ImportConfig {
    ImportConfig::new(ResourceType::Item)
        .with_action(ImportAction::Delete)
        .with_identifier(0, term("dcterms:identifier"))
}

#[test]
fn delete_issues_exactly_one_call_per_matching_row() {
    let mut store = RecordingStore::new();
    run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("seed");

    let csv = "Identifier\nrow-2\n";
    let report = run_import(delete_config(), &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.deleted, 1);
    assert_eq!(store.deletes, 1);
    assert_eq!(store.inner.count(ResourceType::Item), 2);
}

#[test]
fn delete_with_zero_matches_issues_no_call() {
    let mut store = RecordingStore::new();
    run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("seed");

    let csv = "Identifier\nghost\n";
    let report = run_import(delete_config(), &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.failed, 1);
    assert_eq!(store.deletes, 0);
    match &report.outcomes[0].result {
        RowResult::Failed { failure } => {
            assert_eq!(failure.kind, FailureKind::IdentifierNotFound);
        }
        other => panic!("expected identifier failure, got {other:?}"),
    }
}

// ============================================================================
// Action column, abort, cancellation
// ============================================================================

#[test]
fn action_column_overrides_the_job_action_per_row() {
    let mut store = seeded_store();
    let csv = "Identifier,Title,Action\n\
               row-1,Renamed,update\n\
               row-2,,delete\n\
               row-3,Ignored,skip\n\
               row-4,Fresh,\n";
    let config = ImportConfig::new(ResourceType::Item)
        .with_identifier(0, term("dcterms:identifier"))
        .with_property_column(0, PropertyMapping::new(term("dcterms:identifier")))
        .with_property_column(1, PropertyMapping::new(term("dcterms:title")))
        .with_action_column(2);
    let report = run_import(config, &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.updated, 1);
    assert_eq!(report.summary.deleted, 1);
    assert_eq!(report.summary.skipped, 1);
    assert_eq!(report.summary.created, 1);
    assert_eq!(store.count(ResourceType::Item), 3);
}

#[test]
fn unrecognized_action_token_fails_the_row() {
    let mut store = MemoryStore::new();
    let csv = "Identifier,Title,Action\nrow-1,First,merge\n";
    let config = ImportConfig::new(ResourceType::Item)
        .with_property_column(1, PropertyMapping::new(term("dcterms:title")))
        .with_action_column(2);
    let report = run_import(config, &rows(csv), &mut store).expect("run");
    assert_eq!(report.summary.failed, 1);
    match &report.outcomes[0].result {
        RowResult::Failed { failure } => {
            assert_eq!(failure.kind, FailureKind::InvalidAction);
        }
        other => panic!("expected invalid action, got {other:?}"),
    }
}

#[test]
fn connection_failure_aborts_the_remaining_rows() {
    let mut store = MemoryStore::new();
    store.set_connection_down(true);
    let report = run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("run");
    assert!(report.summary.aborted);
    assert_eq!(report.summary.failed, 1);
    // Rows 2 and 3 never reached an outcome.
    assert_eq!(report.outcomes.len(), 1);
}

/// Observer that cancels the job after the first recorded row.
struct CancelAfterFirst {
    flag: curio_core::CancelFlag,
    seen: usize,
}

impl ProgressObserver for CancelAfterFirst {
    fn on_row(&mut self, _outcome: &RowOutcome) {
        self.seen += 1;
        if self.seen == 1 {
            self.flag.cancel();
        }
    }
}

#[test]
fn cancellation_stops_between_rows() {
    let mut store = MemoryStore::new();
    let job = ImportJob::new(create_config()).expect("job");
    let mut observer = CancelAfterFirst {
        flag: job.cancel_flag(),
        seen: 0,
    };
    let report = job.run(&rows(CREATE_CSV), &mut store, &mut observer);
    assert!(report.summary.cancelled);
    assert!(!report.summary.aborted);
    assert_eq!(report.summary.processed(), 1);
    assert_eq!(store.count(ResourceType::Item), 1);
}

#[test]
fn report_serializes_for_the_host() {
    let mut store = MemoryStore::new();
    let report = run_import(create_config(), &rows(CREATE_CSV), &mut store).expect("run");
    let json = serde_json::to_value(&report).expect("serialize report");
    assert_eq!(json["summary"]["created"], 3);
    assert_eq!(json["outcomes"][0]["result"]["kind"], "created");
}

#[test]
fn validation_failure_surfaces_before_any_row_runs() {
    let mut store = MemoryStore::new();
    let config = ImportConfig::new(ResourceType::Item).with_action(ImportAction::Update);
    let result = run_import(config, &rows(CREATE_CSV), &mut store);
    assert!(result.is_err());
    assert_eq!(store.count(ResourceType::Item), 0);
}
