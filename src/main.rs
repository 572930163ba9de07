use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use screenlog::capture::default_screen_source;
use screenlog::session::GeminiSummarizer;
use screenlog::ui::install_panic_hook;
use screenlog::{util, App, CaptureScheduler, Config, Quality, SchedulerPaths};

/// Periodic screen capture with rolling archives and session reports
#[derive(Debug, Parser)]
#[command(name = "screenlog", version, about)]
struct Cli {
    /// Seconds between screenshots
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    interval: Option<u64>,

    /// Encoding quality of stored screenshots
    #[arg(long, value_enum)]
    quality: Option<Quality>,

    /// Directory for the master archive
    #[arg(long, value_name = "DIR")]
    dest: Option<PathBuf>,

    /// Work description; also names the master archive
    #[arg(long, default_value = "")]
    description: String,

    /// Ticket identifier written into the report
    #[arg(long, default_value = "")]
    ticket_id: String,

    /// Ticket link written into the report
    #[arg(long, default_value = "")]
    ticket_link: String,

    /// Roll captures into a batch archive every SECS seconds
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    archive_every: Option<u64>,

    /// Data directory for config, logs and temporary files (default ~/.screenlog)
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    util::init_data_dir(cli.data_dir.clone());

    // Log to a file so output never lands on the TUI
    fs::create_dir_all(util::logs_dir())?;
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(util::log_file_path())?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(log_file)
        .with_ansi(false)
        .init();

    install_panic_hook();

    let mut config = Config::load();
    if let Some(secs) = cli.interval {
        config.interval_secs = secs;
    }
    if let Some(quality) = cli.quality {
        config.quality = quality;
    }
    if let Some(secs) = cli.archive_every {
        config.archive_interval_secs = Some(secs);
    }
    if let Some(dest) = cli.dest {
        config.master_dir = Some(dest);
    }

    let mut metadata = config.metadata(cli.description);
    metadata.ticket_id = cli.ticket_id;
    metadata.ticket_link = cli.ticket_link;
    let settings = config.session_settings(metadata);
    tracing::info!(
        interval_secs = settings.interval.as_secs(),
        quality = settings.quality.display_name(),
        archive_every_secs = settings.archive_every.map(|d| d.as_secs()),
        "Starting screenlog"
    );

    let summarizer = GeminiSummarizer::from_env();
    if !summarizer.has_credential() {
        tracing::info!("GEMINI_API_KEY not set; reports will not include a summary");
    }
    let scheduler = CaptureScheduler::new(
        SchedulerPaths::in_data_dir(&util::data_dir()),
        default_screen_source(),
        Arc::new(summarizer),
    );

    let mut app = App::new(scheduler, config, util::config_path(), settings);
    app.run().await
}
