//! SQLite database client implementation.
//!
//! SQLite types values, not columns: one column may hold an integer in one
//! row and text in the next, so cells are decoded by each value's storage
//! class.

use super::{connect_with_retry, decode_error, format_query_error};
use crate::config::{DataSource, PoolSettings};
use crate::db::{Cell, ColumnSet, DatabaseClient, ResultSet, ResultSetBuilder, Row};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column as _, Executor, Row as _, TypeInfo, ValueRef};
use tracing::debug;

/// SQLite database client.
#[derive(Debug)]
pub struct SqliteClient {
    pool: SqlitePool,
}

impl SqliteClient {
    /// Opens a connection pool.
    pub async fn connect(source: &DataSource, settings: &PoolSettings) -> Result<Self> {
        let pool = connect_with_retry(source, || {
            SqlitePoolOptions::new()
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
impl DatabaseClient for SqliteClient {
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

/// Converts a sqlx SqliteRow to our Row type.
fn convert_row(row: &SqliteRow, columns: &ColumnSet, row_number: usize) -> Result<Row> {
    let mut cells = Vec::with_capacity(row.len());
    for index in 0..row.len() {
        let raw = row
            .try_get_raw(index)
            .map_err(|e| decode_error(columns, row_number, index, "?", e))?;
        if raw.is_null() {
            cells.push(Cell::Null);
            continue;
        }

        // The value's own type info reports its storage class, not the declared type
        let type_name = raw.type_info().name().to_ascii_uppercase();
        let cell = convert_value(row, index, &type_name)
            .map_err(|e| decode_error(columns, row_number, index, &type_name, e))?;
        cells.push(cell);
    }
    Ok(cells)
}

fn convert_value(row: &SqliteRow, index: usize, type_name: &str) -> sqlx::Result<Cell> {
    let cell = match type_name {
        "INTEGER" => Cell::Int(row.try_get_unchecked(index)?),
        "REAL" => Cell::Float(row.try_get_unchecked(index)?),
        "BOOLEAN" => Cell::Bool(row.try_get_unchecked(index)?),
        "BLOB" => Cell::Bytes(row.try_get_unchecked(index)?),
        _ => match row.try_get_unchecked::<String, _>(index) {
            Ok(s) => Cell::Text(s),
            Err(_) => Cell::Bytes(row.try_get_unchecked(index)?),
        },
    };
    Ok(cell)
}
