//! PostgreSQL database client implementation.
//!
//! Provides the `PostgresClient` struct that implements the `DatabaseClient` trait
//! for PostgreSQL databases using sqlx.

use super::{connect_with_retry, decode_error, format_query_error};
use crate::config::{DataSource, PoolSettings};
use crate::db::{Cell, ColumnSet, DatabaseClient, ResultSet, ResultSetBuilder, Row};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow, Postgres};
use sqlx::{Column as _, Decode, Executor, Row as _, TypeInfo, ValueRef};
use tracing::debug;

/// PostgreSQL database client.
#[derive(Debug)]
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Opens a connection pool.
    pub async fn connect(source: &DataSource, settings: &PoolSettings) -> Result<Self> {
        let pool = connect_with_retry(source, || {
            PgPoolOptions::new()
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
impl DatabaseClient for PostgresClient {
    async fn materialize(&self, sql: &str) -> Result<ResultSet> {
        let describe = (&self.pool)
            .describe(sql)
            .await
            .map_err(|e| ExportError::query(format_query_error(&e)))?;
        let columns = ColumnSet::new(describe.columns().iter().map(|col| col.name()));
        debug!("Query reports {} columns", columns.len());

        let mut builder = ResultSetBuilder::new(columns);

        // A raw &str runs over the simple query protocol, so every value
        // arrives in text format and can always be read back as a string.
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

/// Converts a sqlx PgRow to our Row type.
fn convert_row(row: &PgRow, columns: &ColumnSet, row_number: usize) -> Result<Row> {
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

/// Converts a single non-null column value based on its Postgres type.
fn convert_value(row: &PgRow, index: usize, type_name: &str) -> sqlx::Result<Cell> {
    let cell = match type_name {
        "BOOL" => Cell::Bool(row.try_get_unchecked(index)?),
        "INT2" => Cell::Int(row.try_get_unchecked::<i16, _>(index)?.into()),
        "INT4" => Cell::Int(row.try_get_unchecked::<i32, _>(index)?.into()),
        "INT8" => Cell::Int(row.try_get_unchecked(index)?),
        "FLOAT4" => Cell::from_f32(row.try_get_unchecked(index)?),
        "FLOAT8" => Cell::Float(row.try_get_unchecked(index)?),
        // NaN and values beyond 28 significant digits stay textual
        "NUMERIC" => decode_or_text(row, index, Cell::Decimal)?,
        "BYTEA" => Cell::Bytes(row.try_get_unchecked(index)?),
        // infinity, -infinity and BC dates have no chrono equivalent
        "DATE" => decode_or_text(row, index, Cell::Date)?,
        "TIME" => decode_or_text(row, index, Cell::Time)?,
        "TIMESTAMP" => decode_or_text(row, index, Cell::Timestamp)?,
        "TIMESTAMPTZ" => decode_or_text(row, index, Cell::TimestampTz)?,

        // For all other types, read the text representation
        _ => Cell::Text(row.try_get_unchecked(index)?),
    };
    Ok(cell)
}

/// Decodes as `T`, falling back to the value's text form.
fn decode_or_text<'r, T>(
    row: &'r PgRow,
    index: usize,
    wrap: fn(T) -> Cell,
) -> sqlx::Result<Cell>
where
    T: Decode<'r, Postgres>,
{
    match row.try_get_unchecked::<T, _>(index) {
        Ok(value) => Ok(wrap(value)),
        Err(_) => Ok(Cell::Text(row.try_get_unchecked(index)?)),
    }
}
