//! Integration tests for sqlmail.

pub mod common;
pub mod config_test;
pub mod mysql_test;
pub mod postgres_test;
pub mod sqlite_test;
