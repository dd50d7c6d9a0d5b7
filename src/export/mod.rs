//! Rendering of result sets into spreadsheet-ready grids.
//!
//! The renderer only produces strings; file formats live behind the
//! [`SpreadsheetWriter`] trait.

mod grid;
mod xlsx;

pub use grid::Grid;
pub use xlsx::{XlsxWriter, ROW_HEIGHT_POINTS, SHEET_NAME};

use crate::db::{Cell, ColumnSet, ResultSet, Row};
use crate::error::Result;
use std::path::Path;

/// Persists a grid to a file.
pub trait SpreadsheetWriter: Send + Sync {
    /// Writes `grid` to `destination`, replacing any existing file.
    fn write(&self, grid: &Grid, destination: &Path) -> Result<()>;
}

/// Renders columns and rows into a grid, header first.
///
/// Order is preserved exactly; NULL cells become empty strings.
pub fn render(columns: &ColumnSet, rows: &[Row]) -> Grid {
    let header = columns.iter().map(String::from).collect();
    let mut grid = Grid::with_header(header, rows.len());
    for row in rows {
        grid.push_row(row.iter().map(Cell::to_display_string).collect());
    }
    grid
}

/// Renders a whole result set.
pub fn render_result_set(result: &ResultSet) -> Grid {
    render(result.columns(), result.rows())
}
