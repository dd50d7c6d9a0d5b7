//! Database abstraction layer for sqlmail.
//!
//! Each backend materializes an arbitrary query into a [`ResultSet`] of
//! runtime-typed [`Cell`]s behind the [`DatabaseClient`] trait.

mod mock;
mod mysql;
mod postgres;
mod sqlite;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient};
pub use mysql::MySqlClient;
pub use postgres::PostgresClient;
pub use sqlite::SqliteClient;
pub use types::{Cell, ColumnSet, ResultSet, ResultSetBuilder, Row};

use crate::config::{DataSource, PoolSettings};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum number of connection attempts.
const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Base delay between connection attempts (doubles each retry).
const RETRY_BASE_DELAY_MS: u64 = 500;

/// Supported database backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseBackend {
    MySql,
    Postgres,
    Sqlite,
}

impl DatabaseBackend {
    /// Returns the backend as a string for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MySql => "mysql",
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }

    /// Detects the backend from a connection URL prefix.
    pub fn from_url(url: &str) -> Option<Self> {
        let lower = url.to_ascii_lowercase();
        if lower.starts_with("mysql://") {
            Some(Self::MySql)
        } else if lower.starts_with("postgres://") || lower.starts_with("postgresql://") {
            Some(Self::Postgres)
        } else if lower.starts_with("sqlite:") {
            Some(Self::Sqlite)
        } else {
            None
        }
    }
}

/// Opens a pool for the given data source.
///
/// The returned client owns the pool until [`DatabaseClient::close`] is called.
pub async fn connect(
    source: &DataSource,
    settings: &PoolSettings,
) -> Result<Box<dyn DatabaseClient>> {
    match source.backend() {
        DatabaseBackend::MySql => Ok(Box::new(MySqlClient::connect(source, settings).await?)),
        DatabaseBackend::Postgres => Ok(Box::new(PostgresClient::connect(source, settings).await?)),
        DatabaseBackend::Sqlite => Ok(Box::new(SqliteClient::connect(source, settings).await?)),
    }
}

/// Trait defining the interface for database clients.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a query and decodes every row.
    ///
    /// Column names come from the statement metadata before any row is read.
    /// A failure on any row discards the rows read so far.
    async fn materialize(&self, sql: &str) -> Result<ResultSet>;

    /// Closes the connection pool.
    async fn close(&self) -> Result<()>;
}

/// Runs `attempt` until it succeeds, retrying transient connection failures.
pub(crate) async fn connect_with_retry<T, F, Fut>(
    source: &DataSource,
    mut attempt: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, sqlx::Error>>,
{
    let mut delay = Duration::from_millis(RETRY_BASE_DELAY_MS);
    let mut tries = 0;

    loop {
        tries += 1;
        debug!("Connection attempt {} of {}", tries, MAX_RETRY_ATTEMPTS);

        match attempt().await {
            Ok(pool) => {
                debug!("Connected to {}", source.display_string());
                return Ok(pool);
            }
            Err(e) if tries < MAX_RETRY_ATTEMPTS && is_transient_error(&e) => {
                warn!(
                    "Connection attempt {} failed (transient error), retrying in {:?}",
                    tries, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2; // Exponential backoff
            }
            Err(e) => return Err(map_connection_error(e, source)),
        }
    }
}

/// Determines if an error is transient and worth retrying.
fn is_transient_error(error: &sqlx::Error) -> bool {
    if matches!(error, sqlx::Error::PoolTimedOut | sqlx::Error::Io(_)) {
        return true;
    }

    let error_str = error.to_string().to_lowercase();

    // Authentication and database-not-found errors are not transient
    if error_str.contains("authentication failed")
        || error_str.contains("access denied")
        || error_str.contains("does not exist")
        || error_str.contains("unknown database")
        || error_str.contains("ssl")
        || error_str.contains("tls")
    {
        return false;
    }

    error_str.contains("connection refused")
        || error_str.contains("timed out")
        || error_str.contains("temporarily unavailable")
        || error_str.contains("connection reset")
        || error_str.contains("broken pipe")
}

/// Maps sqlx connection errors to user-facing messages.
fn map_connection_error(error: sqlx::Error, source: &DataSource) -> ExportError {
    let target = source.display_string();
    let error_str = error.to_string().to_lowercase();

    if error_str.contains("connection refused") || error_str.contains("could not connect") {
        ExportError::query(format!(
            "Cannot connect to {target}. Check that the server is running."
        ))
    } else if error_str.contains("authentication failed") || error_str.contains("access denied") {
        ExportError::query(format!(
            "Authentication failed for {target}. Check your credentials."
        ))
    } else if (error_str.contains("does not exist") && error_str.contains("database"))
        || error_str.contains("unknown database")
    {
        ExportError::query(format!("Database in {target} does not exist."))
    } else if error_str.contains("ssl") || error_str.contains("tls") {
        ExportError::query(format!("TLS negotiation with {target} failed: {error}"))
    } else if error_str.contains("timed out") || error_str.contains("timeout") {
        ExportError::query(format!(
            "Connection to {target} timed out. The server may be overloaded or unreachable."
        ))
    } else {
        ExportError::query(format!("Cannot connect to {target}: {error}"))
    }
}

/// Formats a query error, keeping the database's own message.
pub(crate) fn format_query_error(error: &sqlx::Error) -> String {
    match error.as_database_error() {
        Some(db_error) => {
            let mut result = String::from("ERROR: ");
            result.push_str(db_error.message());

            if let Some(pg_error) = db_error.try_downcast_ref::<sqlx::postgres::PgDatabaseError>()
            {
                if let Some(detail) = pg_error.detail() {
                    result.push_str("\n  DETAIL: ");
                    result.push_str(detail);
                }
                if let Some(hint) = pg_error.hint() {
                    result.push_str("\n  HINT: ");
                    result.push_str(hint);
                }
            }
            result
        }
        None => error.to_string(),
    }
}

/// Builds the decode error for one cell.
pub(crate) fn decode_error(
    columns: &ColumnSet,
    row: usize,
    index: usize,
    type_name: &str,
    error: impl std::fmt::Display,
) -> ExportError {
    ExportError::decode(format!(
        "row {row}, column `{}` ({type_name}): {error}",
        columns.name(index).unwrap_or("?")
    ))
}
