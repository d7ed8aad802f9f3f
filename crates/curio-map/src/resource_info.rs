//! Resource class and template mapping.

use curio_model::ImportConfig;

use crate::datum::{MappedDatum, assign_scalar};

/// Maps the scalar resource-class and resource-template columns.
///
/// Several columns may be configured for each scalar; they are read in
/// column-index order and a later non-empty value overwrites an earlier one
/// (with a warning when they differ). An empty cell produces no assignment,
/// so an update never clears an existing class by accident.
#[derive(Debug, Clone)]
pub struct ResourceInfoMapper {
    class_columns: Vec<usize>,
    template_columns: Vec<usize>,
}

impl ResourceInfoMapper {
    pub fn from_config(config: &ImportConfig) -> Self {
        Self {
            class_columns: sorted(config.resource_class_columns.clone()),
            template_columns: sorted(config.resource_template_columns.clone()),
        }
    }

    pub fn columns(&self) -> Vec<usize> {
        let mut columns = self.class_columns.clone();
        columns.extend(&self.template_columns);
        columns.sort_unstable();
        columns.dedup();
        columns
    }

    pub fn map_row(&self, row: &[String]) -> MappedDatum {
        let mut datum = MappedDatum::new();
        for &column in &self.class_columns {
            assign_scalar(
                &mut datum.resource_class,
                scalar_cell(row, column),
                "resource_class",
            );
        }
        for &column in &self.template_columns {
            assign_scalar(
                &mut datum.resource_template,
                scalar_cell(row, column),
                "resource_template",
            );
        }
        datum
    }
}

fn sorted(mut columns: Vec<usize>) -> Vec<usize> {
    columns.sort_unstable();
    columns.dedup();
    columns
}

fn scalar_cell(row: &[String], column: usize) -> Option<String> {
    let cell = row.get(column)?.trim();
    if cell.is_empty() {
        None
    } else {
        Some(cell.to_string())
    }
}
