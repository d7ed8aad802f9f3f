pub mod error;
pub mod multivalue;
pub mod rows;

pub use error::{IngestError, Result};
pub use multivalue::{split_cell, split_trimmed, split_with_policy};
pub use rows::{RowSet, read_rows, read_rows_from_reader};
