//! MySQL database client implementation.
//!
//! Queries run over the text protocol, the same way the Go driver behind
//! older configs executed them, so every column can fall back to its string
//! form.

use super::{connect_with_retry, decode_error, format_query_error};
use crate::config::{DataSource, PoolSettings};
use crate::db::{Cell, ColumnSet, DatabaseClient, ResultSet, ResultSetBuilder, Row};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::mysql::{MySql, MySqlPool, MySqlPoolOptions, MySqlRow};
use sqlx::{Column as _, Decode, Executor, Row as _, TypeInfo, ValueRef};
use tracing::debug;

/// MySQL database client.
#[derive(Debug)]
pub struct MySqlClient {
    pool: MySqlPool,
}

impl MySqlClient {
    /// Opens a connection pool.
    pub async fn connect(source: &DataSource, settings: &PoolSettings) -> Result<Self> {
        let pool = connect_with_retry(source, || {
            MySqlPoolOptions::new()
                .max_connections(settings.max_connections)
                .min_connections(settings.min_connections)
                .idle_timeout(settings.idle_timeout())
                .max_lifetime(settings.max_lifetime())
                .acquire_timeout(settings.acquire_timeout())
                .connect(source.url())
        })
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabaseClient for MySqlClient {
    async fn materialize(&self, sql: &str) -> Result<ResultSet> {
        let describe = (&self.pool)
            .describe(sql)
            .await
            .map_err(|e| ExportError::query(format_query_error(&e)))?;
        let columns = ColumnSet::new(describe.columns().iter().map(|col| col.name()));
        debug!("Query reports {} columns", columns.len());

        let mut builder = ResultSetBuilder::new(columns);
        let mut cursor = (&self.pool).fetch(sql);
        while let Some(row) = cursor
            .try_next()
            .await
            .map_err(|e| ExportError::query(format_query_error(&e)))?
        {
            let cells = convert_row(&row, builder.columns(), builder.row_count() + 1)?;
            builder.push(cells)?;
        }

        Ok(builder.finish())
    }

    async fn close(&self) -> Result<()> {
        self.pool.close().await;
        Ok(())
    }
}

/// Converts a sqlx MySqlRow to our Row type.
fn convert_row(row: &MySqlRow, columns: &ColumnSet, row_number: usize) -> Result<Row> {
    let mut cells = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        let raw = row
            .try_get_raw(index)
            .map_err(|e| decode_error(columns, row_number, index, "?", e))?;
        if raw.is_null() {
            cells.push(Cell::Null);
            continue;
        }

        let type_name = raw.type_info().name().to_ascii_uppercase();
        let cell = convert_value(row, index, &type_name)
            .map_err(|e| decode_error(columns, row_number, index, &type_name, e))?;
        cells.push(cell);
    }
    Ok(cells)
}

/// Converts a single non-null column value based on its MySQL type.
fn convert_value(row: &MySqlRow, index: usize, type_name: &str) -> sqlx::Result<Cell> {
    if type_name.ends_with(" UNSIGNED") {
        return Ok(Cell::UInt(row.try_get_unchecked(index)?));
    }

    let cell = match type_name {
        "BOOLEAN" => Cell::Bool(row.try_get_unchecked(index)?),
        "TINYINT" | "SMALLINT" | "MEDIUMINT" | "INT" | "BIGINT" => {
            Cell::Int(row.try_get_unchecked(index)?)
        }
        "FLOAT" => Cell::from_f32(row.try_get_unchecked(index)?),
        "DOUBLE" => Cell::Float(row.try_get_unchecked(index)?),
        // DECIMAL(65, 30) does not fit rust_decimal; keep those textual
        "DECIMAL" => decode_or_text(row, index, Cell::Decimal)?,
        // Zero dates such as 0000-00-00 have no chrono equivalent
        "DATE" => decode_or_text(row, index, Cell::Date)?,
        "DATETIME" => decode_or_text(row, index, Cell::Timestamp)?,
        "TIMESTAMP" => decode_or_text(row, index, Cell::TimestampTz)?,
        "BINARY" | "VARBINARY" | "BIT" | "GEOMETRY" => Cell::Bytes(row.try_get_unchecked(index)?),
        name if name.ends_with("BLOB") => Cell::Bytes(row.try_get_unchecked(index)?),

        // TIME may be negative or exceed 24h, so it stays textual along with
        // YEAR, JSON, ENUM, SET and the character types
        _ => match row.try_get_unchecked::<String, _>(index) {
            Ok(s) => Cell::Text(s),
            Err(_) => Cell::Bytes(row.try_get_unchecked(index)?),
        },
    };
    Ok(cell)
}

/// Decodes as `T`, falling back to the value's text form.
fn decode_or_text<'r, T>(
    row: &'r MySqlRow,
    index: usize,
    wrap: fn(T) -> Cell,
) -> sqlx::Result<Cell>
where
    T: Decode<'r, MySql>,
{
    match row.try_get_unchecked::<T, _>(index) {
        Ok(value) => Ok(wrap(value)),
        Err(_) => Ok(Cell::Text(row.try_get_unchecked(index)?)),
    }
}
