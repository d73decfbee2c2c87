use anyhow::{Context, Result};
use clap::Parser;
use job_watch::ConfigManager;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::{error, info, warn};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "job-watch")]
#[command(about = "Crawl NHS Jobs searches and post new listings to Telegram")]
struct Cli {
    /// SQLite file holding processed jobs (overrides DATABASE_PATH)
    #[arg(long)]
    database_path: Option<PathBuf>,

    /// JSON log output
    #[arg(long, default_value = "app.log")]
    log_file: PathBuf,

    /// Environment file read before configuration is loaded
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let Cli {
        database_path,
        log_file,
        env_file,
    } = Cli::parse();

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .json()
                .with_writer(file)
                .with_current_span(false)
                .with_span_list(false),
        )
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let result = async move {
        let mut config = ConfigManager::load(&env_file)?;
        if let Some(path) = database_path {
            config = config.with_database_path(path);
        }
        info!("Database: {}", config.database_path.display());
        job_watch::run(&config).await
    }
    .await;

    match result {
        Ok(report) => {
            if !report.is_clean() {
                warn!("{} jobs or searches failed this run", report.failures.len());
            }
            Ok(())
        }
        Err(e) => {
            error!("An error occurred: {:#}", e);
            Err(e)
        }
    }
}
