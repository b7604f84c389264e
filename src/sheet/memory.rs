use std::collections::BTreeMap;

use super::{Column, Sheet, SheetRow, COLUMNS};
use crate::error::StoreError;

/// Sheet held entirely in memory. Backs dry runs and tests.
#[derive(Debug, Default, Clone)]
pub struct MemorySheet {
    rows: BTreeMap<usize, SheetRow>,
}

impl MemorySheet {
    /// Snapshot of another sheet's contents, formats included.
    pub fn from_rows(rows: Vec<SheetRow>) -> Self {
        Self {
            rows: rows.into_iter().map(|r| (r.row, r)).collect(),
        }
    }

    fn row_mut(&mut self, row: usize) -> Result<&mut SheetRow, StoreError> {
        if row == 0 {
            return Err(StoreError::InvalidRow(row));
        }
        Ok(self.rows.entry(row).or_insert_with(|| SheetRow {
            row,
            ..Default::default()
        }))
    }
}

impl Sheet for MemorySheet {
    fn column(&self, column: Column) -> Result<Vec<(usize, String)>, StoreError> {
        Ok(self
            .rows
            .iter()
            .map(|(row, data)| (*row, data.cell(column).to_string()))
            .collect())
    }

    fn range(&self) -> Result<Vec<SheetRow>, StoreError> {
        Ok(self.rows.values().cloned().collect())
    }

    fn write_row(&mut self, row: usize, values: &[String; COLUMNS]) -> Result<(), StoreError> {
        self.row_mut(row)?.cells = values.clone();
        Ok(())
    }

    fn set_number_format(
        &mut self,
        row: usize,
        column: Column,
        format: &str,
    ) -> Result<(), StoreError> {
        self.row_mut(row)?.formats[column.index()] = Some(format.to_string());
        Ok(())
    }
}
