//! Delimited-text row tokenization.
//!
//! Reads an input file into an ordered set of rows. The first record is the
//! header row; every data row is padded (or truncated) to the header width so
//! downstream mappers can index cells without bounds checks. Entirely blank
//! rows are dropped before processing.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;

use crate::error::{IngestError, Result};

/// One tokenized input file: a header row plus data rows in file order.
///
/// Cells keep their interior whitespace; only the UTF-8 BOM is stripped.
/// Trimming decisions belong to the mappers.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RowSet {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RowSet {
    /// Number of columns, as defined by the header row.
    pub fn width(&self) -> usize {
        self.headers.len()
    }

    /// Iterate data rows with their 1-based row numbers.
    pub fn numbered_rows(&self) -> impl Iterator<Item = (usize, &[String])> {
        self.rows
            .iter()
            .enumerate()
            .map(|(index, row)| (index + 1, row.as_slice()))
    }
}

fn strip_bom(raw: &str) -> &str {
    raw.strip_prefix('\u{feff}').unwrap_or(raw)
}

fn is_blank(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Tokenize a delimited-text file with the given field delimiter.
pub fn read_rows(path: &Path, delimiter: u8) -> Result<RowSet> {
    let file = File::open(path).map_err(|source| IngestError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    read_rows_from_reader(file, delimiter)
}

/// Tokenize delimited text from any reader. The first record is the header.
pub fn read_rows_from_reader<R: Read>(reader: R, delimiter: u8) -> Result<RowSet> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut headers: Option<Vec<String>> = None;
    let mut rows: Vec<Vec<String>> = Vec::new();

    for (index, record) in csv_reader.records().enumerate() {
        let record = record.map_err(|source| IngestError::Record {
            record: index + 1,
            source,
        })?;
        let cells: Vec<String> = record
            .iter()
            .map(|cell| strip_bom(cell).to_string())
            .collect();

        let Some(width) = headers.as_ref().map(Vec::len) else {
            headers = Some(cells.iter().map(|cell| cell.trim().to_string()).collect());
            continue;
        };

        if is_blank(&cells) {
            tracing::debug!(row = index, "skipping blank row");
            continue;
        }

        rows.push(pad_to_width(cells, width, index));
    }

    let headers = headers.ok_or(IngestError::MissingHeader)?;
    Ok(RowSet { headers, rows })
}

/// Recover a malformed row by treating missing columns as empty cells.
fn pad_to_width(mut cells: Vec<String>, width: usize, record: usize) -> Vec<String> {
    if cells.len() < width {
        tracing::debug!(
            row = record,
            cells = cells.len(),
            width,
            "padding short row to header width"
        );
        cells.resize(width, String::new());
    } else if cells.len() > width {
        tracing::warn!(
            row = record,
            cells = cells.len(),
            width,
            "dropping cells beyond header width"
        );
        cells.truncate(width);
    }
    cells
}
