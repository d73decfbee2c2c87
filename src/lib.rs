use anyhow::Result;
use tracing::info;

pub mod core;
pub mod crawler;
pub mod error;
pub mod geo;
pub mod notify;
pub mod scraping;
pub mod utils;

pub use crate::core::{ConfigManager, Database, JobRecord};
pub use crawler::{Crawler, RunReport};

/// Run one full crawl with the given configuration.
///
/// The database and origin coordinate are acquired here and released when the
/// run ends, whether or not it succeeded.
pub async fn run(config: &ConfigManager) -> Result<RunReport> {
    let crawler = Crawler::from_config(config).await?;
    let result = crawler.run().await;
    crawler.close().await;

    let report = result?;
    info!(
        "Crawl complete in {}s",
        report
            .finished_at
            .map(|end| (end - report.started_at).num_seconds())
            .unwrap_or_default()
    );
    Ok(report)
}
