//! sqlmail - run a SQL query and mail the result as a spreadsheet.

use sqlmail::cli::Cli;
use sqlmail::config::Config;
use sqlmail::db;
use sqlmail::error::Result;
use sqlmail::export::XlsxWriter;
use sqlmail::job::ExportJob;
use sqlmail::logging;
use sqlmail::mail::SmtpNotifier;
use tracing::{error, info, warn};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{}: {}", e.category(), e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let source = config.data.data_source()?;
    info!(
        "Connecting to {} ({})",
        source.display_string(),
        source.backend().as_str()
    );
    let client = db::connect(&source, &config.pool).await?;

    let writer = XlsxWriter::new();
    let notifier = SmtpNotifier::new(&config.email);
    let mut job = ExportJob::new(client.as_ref(), &writer);
    if cli.send_email() {
        job = job.with_notifier(&notifier);
    }

    let outcome = job.run(&config.data, &cli.output_dir()).await;

    // The pool is closed whether or not the job succeeded
    if let Err(e) = client.close().await {
        warn!("Failed to close connection pool: {}", e);
    }

    let report = outcome?;
    info!(
        "Done: {} rows exported to {}{}",
        report.rows,
        report.output.display(),
        if report.sent { ", mail sent" } else { "" }
    );
    Ok(())
}
