pub mod job;
pub mod resolver;
pub mod store;

pub use job::{CancelFlag, ImportJob, NoProgress, ProgressObserver, run_import, run_import_file};
pub use resolver::{MappedScope, Resolution, apply_merge, resolve_target};
pub use store::memory::MemoryStore;
pub use store::{ResourceStore, SearchFilter, StoreError, StoredResource};
