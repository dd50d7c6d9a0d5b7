//! XLSX spreadsheet writer.

use super::{Grid, SpreadsheetWriter};
use crate::error::{ExportError, Result};
use rust_xlsxwriter::{Workbook, XlsxError};
use std::path::Path;
use tracing::{debug, warn};

/// Name of the single worksheet in every export.
pub const SHEET_NAME: &str = "sheet1";

/// Row height in points (1 cm).
pub const ROW_HEIGHT_POINTS: f64 = 28.35;

/// Excel worksheet limits.
const MAX_ROWS: usize = 1_048_576;
const MAX_COLUMNS: usize = 16_384;
const MAX_CELL_CHARS: usize = 32_767;

/// Writes grids as single-sheet `.xlsx` workbooks.
#[derive(Debug, Clone, Copy, Default)]
pub struct XlsxWriter;

impl XlsxWriter {
    /// Creates a writer.
    pub fn new() -> Self {
        Self
    }
}

impl SpreadsheetWriter for XlsxWriter {
    fn write(&self, grid: &Grid, destination: &Path) -> Result<()> {
        if grid.len() > MAX_ROWS {
            return Err(ExportError::write(format!(
                "{} rows exceed the worksheet limit of {MAX_ROWS}",
                grid.len()
            )));
        }
        if grid.width() > MAX_COLUMNS {
            return Err(ExportError::write(format!(
                "{} columns exceed the worksheet limit of {MAX_COLUMNS}",
                grid.width()
            )));
        }

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME).map_err(map_xlsx_error)?;

        for (row_index, row) in grid.rows().iter().enumerate() {
            // Bounds were checked above
            let row_num = row_index as u32;
            worksheet
                .set_row_height(row_num, ROW_HEIGHT_POINTS)
                .map_err(map_xlsx_error)?;
            for (col_index, value) in row.iter().enumerate() {
                let text = fit_cell(value, row_index, col_index);
                worksheet
                    .write_string(row_num, col_index as u16, text)
                    .map_err(map_xlsx_error)?;
            }
        }
        worksheet.autofit();

        workbook.save(destination).map_err(|e| {
            ExportError::write(format!("Failed to save {}: {e}", destination.display()))
        })?;

        debug!(
            "Wrote {} rows x {} columns to {}",
            grid.len(),
            grid.width(),
            destination.display()
        );
        Ok(())
    }
}

/// Truncates text beyond the per-cell character limit.
fn fit_cell(value: &str, row: usize, column: usize) -> &str {
    match value.char_indices().nth(MAX_CELL_CHARS) {
        Some((cut, _)) => {
            warn!(
                "Cell at row {}, column {} truncated to {MAX_CELL_CHARS} characters",
                row + 1,
                column + 1
            );
            &value[..cut]
        }
        None => value,
    }
}

fn map_xlsx_error(error: XlsxError) -> ExportError {
    ExportError::write(error.to_string())
}
