//! Header-plus-data string table.

/// A rectangular table of display strings. Row 0 is the header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    rows: Vec<Vec<String>>,
    width: usize,
}

impl Grid {
    /// Starts a grid from its header row.
    pub(crate) fn with_header(header: Vec<String>, data_rows: usize) -> Self {
        let width = header.len();
        let mut rows = Vec::with_capacity(data_rows + 1);
        rows.push(header);
        Self { rows, width }
    }

    /// Appends a data row.
    pub(crate) fn push_row(&mut self, row: Vec<String>) {
        debug_assert_eq!(row.len(), self.width, "grid rows must be as wide as the header");
        self.rows.push(row);
    }

    /// All rows, header first.
    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// The header row.
    pub fn header(&self) -> &[String] {
        &self.rows[0]
    }

    /// Rows after the header.
    pub fn data_rows(&self) -> &[Vec<String>] {
        &self.rows[1..]
    }

    /// Number of rows including the header.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// A grid always has a header row.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Consumes the grid, returning all rows header first.
    pub fn into_rows(self) -> Vec<Vec<String>> {
        self.rows
    }
}
