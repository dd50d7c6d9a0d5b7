//! Shared helpers for integration tests.

use sqlmail::config::{DataSource, PoolSettings};
use sqlmail::db::{self, DatabaseClient};
use tempfile::TempDir;

/// A SQLite database file that lives as long as the value.
pub struct TestDatabase {
    _dir: TempDir,
    pub url: String,
}

/// Creates a SQLite database and runs `setup` against it.
pub async fn sqlite_database(setup: &[&str]) -> TestDatabase {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

    let pool = sqlx::SqlitePool::connect(&url).await.unwrap();
    for statement in setup {
        sqlx::query(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;

    TestDatabase { _dir: dir, url }
}

/// Connects through the same path the binary uses.
pub async fn connect(url: &str) -> Box<dyn DatabaseClient> {
    let source = DataSource::parse(url).unwrap();
    db::connect(&source, &PoolSettings::default()).await.unwrap()
}
