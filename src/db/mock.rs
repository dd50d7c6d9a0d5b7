//! Mock database clients for testing.
//!
//! Provide canned results and failures so the export job can be exercised
//! without a database server.

use super::{DatabaseClient, ResultSet};
use crate::error::{ExportError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// A mock database client that returns a predefined result set.
#[derive(Debug, Default)]
pub struct MockDatabaseClient {
    result: ResultSet,
    queries: AtomicUsize,
    closed: AtomicBool,
}

impl MockDatabaseClient {
    /// Creates a mock that answers every query with `result`.
    pub fn new(result: ResultSet) -> Self {
        Self {
            result,
            ..Default::default()
        }
    }

    /// Number of queries executed so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    /// Returns true once `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn materialize(&self, _sql: &str) -> Result<ResultSet> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.result.clone())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// A mock database client whose queries always fail.
#[derive(Debug)]
pub struct FailingDatabaseClient {
    kind: FailureKind,
    message: String,
}

#[derive(Debug, Clone, Copy)]
enum FailureKind {
    Query,
    Decode,
}

impl FailingDatabaseClient {
    /// Fails every query with a query error.
    pub fn query_error(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Query,
            message: message.into(),
        }
    }

    /// Fails every query with a decode error.
    pub fn decode_error(message: impl Into<String>) -> Self {
        Self {
            kind: FailureKind::Decode,
            message: message.into(),
        }
    }
}

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn materialize(&self, _sql: &str) -> Result<ResultSet> {
        Err(match self.kind {
            FailureKind::Query => ExportError::query(self.message.clone()),
            FailureKind::Decode => ExportError::decode(self.message.clone()),
        })
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
