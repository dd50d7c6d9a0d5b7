//! Result set types for sqlmail.
//!
//! Defines the type-erased structures a query is materialized into.

use crate::error::{ExportError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rust_decimal::Decimal;
use std::fmt;

/// Ordered column names as reported by the query's metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    names: Vec<String>,
}

impl ColumnSet {
    /// Creates a column set from names in database order.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the query produced no columns.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Column name at the given position.
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Iterates over column names in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

/// A single decoded value. The variant is chosen by the value's runtime type.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Signed integer (up to i64).
    Int(i64),

    /// Unsigned integer that may not fit in i64.
    UInt(u64),

    /// Floating point number.
    Float(f64),

    /// Exact NUMERIC/DECIMAL value.
    Decimal(Decimal),

    /// Text value.
    Text(String),

    /// Binary data.
    Bytes(Vec<u8>),

    /// Calendar date.
    Date(NaiveDate),

    /// Time of day.
    Time(NaiveTime),

    /// Timestamp without time zone.
    Timestamp(NaiveDateTime),

    /// Timestamp normalized to UTC.
    TimestampTz(DateTime<Utc>),
}

impl Cell {
    /// Returns true if this cell is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Widens a single-precision float without exposing binary noise
    /// (`1.1f32` becomes `1.1`, not `1.100000023841858`).
    pub fn from_f32(v: f32) -> Self {
        Cell::Float(v.to_string().parse().unwrap_or(f64::from(v)))
    }

    /// Converts the cell to its human-readable report form.
    ///
    /// NULL becomes an empty string. Binary data is shown as (lossy) UTF-8
    /// text, since reports are meant to be read rather than re-imported.
    pub fn to_display_string(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::UInt(u) => u.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Decimal(d) => d.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Cell::Date(d) => d.to_string(),
            Cell::Time(t) => t.to_string(),
            Cell::Timestamp(ts) => ts.to_string(),
            Cell::TimestampTz(ts) => ts.to_string(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<i32> for Cell {
    fn from(v: i32) -> Self {
        Cell::Int(v as i64)
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Cell {
    fn from(v: Vec<u8>) -> Self {
        Cell::Bytes(v)
    }
}

impl<T> From<Option<T>> for Cell
where
    T: Into<Cell>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Cell::Null,
        }
    }
}

/// A row of cells, positionally aligned with its [`ColumnSet`].
pub type Row = Vec<Cell>;

/// Columns plus rows in cursor order.
///
/// Only [`ResultSetBuilder`] creates result sets, so every row is exactly as
/// wide as the column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: ColumnSet,
    rows: Vec<Row>,
}

impl ResultSet {
    /// Column names in database order.
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Rows in cursor order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the query returned no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Append-only builder that enforces row width.
#[derive(Debug)]
pub struct ResultSetBuilder {
    columns: ColumnSet,
    rows: Vec<Row>,
}

impl ResultSetBuilder {
    /// Starts a result set once the column metadata is known.
    pub fn new(columns: ColumnSet) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    /// Width every pushed row must have.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column set the rows are aligned with.
    pub fn columns(&self) -> &ColumnSet {
        &self.columns
    }

    /// Appends a row, rejecting it if it is not aligned with the columns.
    pub fn push(&mut self, row: Row) -> Result<()> {
        if row.len() != self.width() {
            return Err(ExportError::decode(format!(
                "row {} has {} values but the query reported {} columns",
                self.rows.len() + 1,
                row.len(),
                self.width()
            )));
        }
        self.rows.push(row);
        Ok(())
    }

    /// Number of rows pushed so far.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Finishes the result set.
    pub fn finish(self) -> ResultSet {
        ResultSet {
            columns: self.columns,
            rows: self.rows,
        }
    }
}
