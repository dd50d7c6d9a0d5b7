//! Command-line argument parsing for sqlmail.

use clap::Parser;
use std::path::PathBuf;

/// Runs a SQL query and mails the result as a spreadsheet.
#[derive(Parser, Debug)]
#[command(name = "sqlmail")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file path
    #[arg(value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory the spreadsheet is written to (default: system temp dir)
    #[arg(long, value_name = "DIR", env = "SQLMAIL_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Write the spreadsheet but do not send mail
    #[arg(long)]
    pub skip_email: bool,
}

impl Cli {
    /// Parses command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Returns the config file path to use.
    ///
    /// Uses the positional argument if provided, otherwise the default path.
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(crate::config::Config::default_path)
    }

    /// Returns the output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Returns true if mail delivery should run.
    pub fn send_email(&self) -> bool {
        !self.skip_email
    }
}
