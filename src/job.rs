//! The export job: query, render, write, mail.
//!
//! Each stage runs once and in order. The first failure ends the run; nothing
//! downstream of a failed stage is invoked.

use crate::config::DataConfig;
use crate::db::DatabaseClient;
use crate::error::Result;
use crate::export::{render_result_set, SpreadsheetWriter};
use crate::mail::{AttachmentDescriptor, Notifier, OutgoingMail};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    /// Number of columns reported by the query.
    pub columns: usize,
    /// Number of data rows, excluding the header.
    pub rows: usize,
    /// Path of the written spreadsheet.
    pub output: PathBuf,
    /// Whether the spreadsheet was attached to the mail.
    pub attached: bool,
    /// Whether a mail was sent.
    pub sent: bool,
}

/// Wires a database client, a spreadsheet writer and an optional notifier.
pub struct ExportJob<'a> {
    db: &'a dyn DatabaseClient,
    writer: &'a dyn SpreadsheetWriter,
    notifier: Option<&'a dyn Notifier>,
}

impl<'a> ExportJob<'a> {
    /// Creates a job that writes the spreadsheet but sends nothing.
    pub fn new(db: &'a dyn DatabaseClient, writer: &'a dyn SpreadsheetWriter) -> Self {
        Self {
            db,
            writer,
            notifier: None,
        }
    }

    /// Sends the result through `notifier` after writing it.
    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Runs the query from `data` and delivers the result.
    ///
    /// The spreadsheet is written to `data.output_path(output_dir)`.
    pub async fn run(&self, data: &DataConfig, output_dir: &Path) -> Result<JobReport> {
        let result = self.db.materialize(&data.sql).await?;
        info!(
            "Query returned {} rows x {} columns",
            result.row_count(),
            result.columns().len()
        );

        let grid = render_result_set(&result);
        let output = data.output_path(output_dir);
        self.writer.write(&grid, &output)?;
        info!("Wrote {}", output.display());

        let mut report = JobReport {
            columns: result.columns().len(),
            rows: result.row_count(),
            output,
            attached: false,
            sent: false,
        };

        let Some(notifier) = self.notifier else {
            info!("Mail delivery skipped");
            return Ok(report);
        };

        let attachment = AttachmentDescriptor::for_path(&report.output);
        if attachment.is_none() {
            warn!(
                "{} does not exist, sending mail without attachment",
                report.output.display()
            );
        }
        report.attached = attachment.is_some();

        let mail = OutgoingMail::from_config(data, attachment);
        notifier.send(&mail).await?;
        info!(
            "Mail '{}' sent to {} recipient(s)",
            mail.subject,
            mail.to.len() + mail.cc.len()
        );
        report.sent = true;

        Ok(report)
    }
}
