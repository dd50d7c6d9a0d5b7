//! Loading job configuration from disk.

use sqlmail::config::{Config, PoolSettings};
use sqlmail::db::DatabaseBackend;
use sqlmail::error::ExportError;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_minimal_config() {
    let file = write_config(
        r#"
[data]
datasource = "report:secret@tcp(db.internal:3306)/sales?charset=utf8mb4"
sql = "SELECT id, name FROM customers"
subject = "Daily customers"
mailto = "ops@example.com;sales@example.com"
plain_body = "See attachment."
attach_name = "customers"

[email]
smtp = "smtp.example.com"
port = 465
user = "robot@example.com"
passwd = "hunter2"
"#,
    );

    let config = Config::load_from_file(file.path()).unwrap();

    assert_eq!(config.email.port, 465);
    assert_eq!(config.email.from_name, "System Mail");
    assert!(!config.email.accept_invalid_certs);
    assert_eq!(config.pool, PoolSettings::default());
    assert!(config.data.cc_recipients().is_empty());
    assert_eq!(config.data.recipients().len(), 2);

    let source = config.data.data_source().unwrap();
    assert_eq!(source.backend(), DatabaseBackend::MySql);
    assert!(!source.display_string().contains("secret"));
}

#[test]
fn test_load_config_with_pool_section() {
    let file = write_config(
        r#"
[data]
datasource = "sqlite::memory:"
sql = "SELECT 1"
mailto = "ops@example.com"
cc = "boss@example.com"
attach_name = "one"

[email]
smtp = "localhost"
user = "robot@example.com"

[pool]
max_connections = 2
"#,
    );

    let config = Config::load_from_file(file.path()).unwrap();

    assert_eq!(config.email.port, 25);
    assert_eq!(config.pool.max_connections, 2);
    assert_eq!(config.pool.idle_timeout_secs, 600);
    assert_eq!(config.data.cc_recipients(), ["boss@example.com"]);
}

#[test]
fn test_missing_file_is_config_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    let err = Config::load_from_file(&path).unwrap_err();
    assert!(matches!(err, ExportError::Config(_)));
    assert!(err.to_string().contains("absent.toml"));
}

#[test]
fn test_invalid_toml_is_config_error() {
    let file = write_config("[data\nsql = ");

    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(matches!(err, ExportError::Config(_)));
}

#[test]
fn test_unknown_scheme_is_rejected() {
    let file = write_config(
        r#"
[data]
datasource = "oracle://db/orcl"
sql = "SELECT 1 FROM dual"
mailto = "ops@example.com"
attach_name = "x"

[email]
smtp = "localhost"
user = "robot@example.com"
"#,
    );

    let err = Config::load_from_file(file.path()).unwrap_err();
    assert!(err.to_string().contains("oracle"));
}
