//! sqlmail - run a SQL query and mail the result as a spreadsheet.
//!
//! This library exposes the core modules for use in integration tests.

pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod job;
pub mod logging;
pub mod mail;
