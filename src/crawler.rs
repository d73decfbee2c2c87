// src/crawler.rs
//! Search enumeration and the per-job pipeline:
//! fetch -> extract -> distance -> notify -> record.

use anyhow::Result;
use chrono::{DateTime, Utc};
use reqwest::Url;
use tracing::{debug, error, info, warn};

use crate::core::config_manager::{PayRange, SearchConfig};
use crate::core::{ConfigManager, Database, Fetcher, JobRecord, JobRepository};
use crate::error::{JobError, StoreError};
use crate::geo::{GeoEnricher, OrsClient};
use crate::notify::TelegramNotifier;
use crate::scraping::{parse_job_fields, parse_search_page};
use crate::utils::{job_url, normalize_job_path};

/// Page limit assumed when the results page has no readable page count
pub const MAX_PAGE_SENTINEL: u32 = 9999;

const SEARCH_PATH: &str = "/candidate/search/results";

/// Position in the results of one keyword/pay range search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCursor {
    pub keyword: String,
    pub pay_range: PayRange,
    pub page: u32,
    pub max_page: u32,
}

impl SearchCursor {
    pub fn new(keyword: &str, pay_range: PayRange) -> Self {
        Self {
            keyword: keyword.to_string(),
            pay_range,
            page: 1,
            max_page: MAX_PAGE_SENTINEL,
        }
    }

    pub fn url(&self, domain: &str) -> String {
        let base = format!("{}{}", domain.trim_end_matches('/'), SEARCH_PATH);
        let page = self.page.to_string();
        let pay_range = self.pay_range.to_string();
        match Url::parse_with_params(
            &base,
            &[
                ("keyword", self.keyword.as_str()),
                ("page", page.as_str()),
                ("payRange", pay_range.as_str()),
            ],
        ) {
            Ok(url) => url.into(),
            Err(_) => base,
        }
    }

    /// Record the page count read from the current page
    pub fn set_max_page(&mut self, max_page: Option<u32>) {
        self.max_page = max_page.unwrap_or(MAX_PAGE_SENTINEL);
    }

    /// Move to the next page; false once the last page has been visited
    pub fn advance(&mut self) -> bool {
        if self.page >= self.max_page {
            return false;
        }
        self.page += 1;
        true
    }
}

#[derive(Debug, Clone)]
pub struct Failure {
    /// Job path or search URL that failed
    pub target: String,
    pub error: String,
}

/// Outcome of one crawl run
#[derive(Debug, Clone)]
pub struct RunReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub pages_visited: u32,
    pub links_seen: u32,
    pub skipped: u32,
    pub notified: Vec<String>,
    pub failures: Vec<Failure>,
    /// Rows in the store when the run finished
    pub stored_jobs: i64,
}

impl RunReport {
    fn new() -> Self {
        Self {
            started_at: Utc::now(),
            finished_at: None,
            pages_visited: 0,
            links_seen: 0,
            skipped: 0,
            notified: Vec::new(),
            failures: Vec::new(),
            stored_jobs: 0,
        }
    }

    fn fail(&mut self, target: &str, error: impl ToString) {
        self.failures.push(Failure {
            target: target.to_string(),
            error: error.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Message sent for a new job
pub fn format_message(domain: &str, record: &JobRecord) -> String {
    format!(
        "{}\n\n{}\n{}\n{}\n{}",
        job_url(domain, &record.path),
        record.title,
        record.salary,
        record.address,
        record.distance
    )
}

pub struct Crawler {
    search: SearchConfig,
    fetcher: Fetcher,
    geo: GeoEnricher,
    notifier: TelegramNotifier,
    db: Database,
}

impl Crawler {
    pub fn new(
        search: SearchConfig,
        fetcher: Fetcher,
        geo: GeoEnricher,
        notifier: TelegramNotifier,
        db: Database,
    ) -> Self {
        Self {
            search,
            fetcher,
            geo,
            notifier,
            db,
        }
    }

    /// Open the database, resolve the origin and build every client
    pub async fn from_config(config: &ConfigManager) -> Result<Self> {
        let db = Database::new(&config.database_path).await?;
        let fetcher = Fetcher::new(config.timeout_seconds)?;
        let ors = OrsClient::new(&config.geo, config.timeout_seconds)?;
        let geo = GeoEnricher::resolve(ors, &config.geo.origin_address).await?;
        let notifier = TelegramNotifier::new(&config.telegram, config.timeout_seconds)?;

        Ok(Self::new(config.search.clone(), fetcher, geo, notifier, db))
    }

    fn jobs(&self) -> JobRepository<'_> {
        self.db.jobs()
    }

    /// Crawl every keyword x pay range pair, keyword-major.
    ///
    /// Per-job and per-search failures are collected in the report; only a
    /// failing database aborts the run.
    pub async fn run(&self) -> Result<RunReport> {
        let mut report = RunReport::new();

        for keyword in &self.search.keywords {
            for pay_range in &self.search.pay_ranges {
                let cursor = SearchCursor::new(keyword, *pay_range);
                self.crawl_search(cursor, &mut report).await?;
            }
        }

        report.stored_jobs = self.jobs().count().await?;
        report.finished_at = Some(Utc::now());
        info!(
            "Run finished: {} pages, {} links, {} skipped, {} notified, {} failures, {} jobs stored",
            report.pages_visited,
            report.links_seen,
            report.skipped,
            report.notified.len(),
            report.failures.len(),
            report.stored_jobs
        );
        for failure in &report.failures {
            error!("{}: {}", failure.target, failure.error);
        }
        Ok(report)
    }

    async fn crawl_search(&self, mut cursor: SearchCursor, report: &mut RunReport) -> Result<()> {
        loop {
            let url = cursor.url(&self.search.domain);
            let html = match self.fetcher.fetch(&url).await {
                Ok(html) => html,
                Err(e) => {
                    warn!(
                        "Search page failed, skipping '{}' {}: {}",
                        cursor.keyword, cursor.pay_range, e
                    );
                    report.fail(&url, e);
                    return Ok(());
                }
            };
            report.pages_visited += 1;
            info!("{} {} page {}", cursor.keyword, cursor.pay_range, cursor.page);

            let page = parse_search_page(&html);
            for link in &page.links {
                report.links_seen += 1;
                if self.jobs().exists(link).await? {
                    debug!("Already processed: {}", link);
                    report.skipped += 1;
                    continue;
                }

                match self.process_job(link).await {
                    Ok(record) => report.notified.push(record.path),
                    Err(JobError::Store(StoreError::Database(e))) => return Err(e.into()),
                    Err(e) => {
                        warn!("Job {} abandoned: {}", link, e);
                        report.fail(normalize_job_path(link), e);
                    }
                }
            }

            cursor.set_max_page(page.max_page);
            if page.links.is_empty() || !cursor.advance() {
                return Ok(());
            }
        }
    }

    /// Notification precedes the insert: a failure in between means the job is
    /// sent again next run rather than never sent.
    pub async fn process_job(&self, link: &str) -> Result<JobRecord, JobError> {
        let path = normalize_job_path(link);
        let html = self.fetcher.fetch(&job_url(&self.search.domain, path)).await?;

        let fields = parse_job_fields(&html)?;
        let distance = self.geo.distance(&fields.address).await;

        info!("{}", fields.title);
        info!("salary\n{}", fields.salary);
        info!("{}", fields.address);
        info!("{}", distance);

        let record = JobRecord {
            path: path.to_string(),
            salary: fields.salary,
            title: fields.title,
            address: fields.address,
            distance,
        };

        self.notifier
            .notify(&format_message(&self.search.domain, &record))
            .await?;
        self.jobs().insert(&record).await?;

        Ok(record)
    }

    /// Release the database connections
    pub async fn close(self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range() -> PayRange {
        PayRange { low: 20, high: 30 }
    }

    #[test]
    fn test_cursor_url() {
        let cursor = SearchCursor::new("healthcare assistant", range());
        assert_eq!(
            cursor.url("https://www.jobs.nhs.uk"),
            "https://www.jobs.nhs.uk/candidate/search/results?keyword=healthcare+assistant&page=1&payRange=20-30"
        );
    }

    #[test]
    fn test_single_page_visits_once() {
        let mut cursor = SearchCursor::new("nurse", range());
        cursor.set_max_page(Some(1));
        assert_eq!(cursor.page, 1);
        assert!(!cursor.advance());
        assert_eq!(cursor.page, 1);
    }

    #[test]
    fn test_cursor_stops_after_last_page() {
        let mut cursor = SearchCursor::new("nurse", range());
        let mut visited = vec![cursor.page];
        loop {
            cursor.set_max_page(Some(3));
            if !cursor.advance() {
                break;
            }
            visited.push(cursor.page);
        }
        assert_eq!(visited, vec![1, 2, 3]);
    }

    #[test]
    fn test_missing_page_count_uses_sentinel() {
        let mut cursor = SearchCursor::new("nurse", range());
        cursor.set_max_page(None);
        assert_eq!(cursor.max_page, MAX_PAGE_SENTINEL);
        assert!(cursor.advance());
        assert_eq!(cursor.page, 2);
    }

    #[test]
    fn test_format_message() {
        let record = JobRecord {
            path: "/candidate/jobadvert/C1".to_string(),
            salary: "£30,000".to_string(),
            title: "Porter".to_string(),
            address: "a\nb\nc\nd\ne".to_string(),
            distance: "Distance: 1 KM\nDuration: 0 hour 2 minutes".to_string(),
        };
        assert_eq!(
            format_message("https://www.jobs.nhs.uk", &record),
            "https://www.jobs.nhs.uk/candidate/jobadvert/C1\n\nPorter\n£30,000\na\nb\nc\nd\ne\nDistance: 1 KM\nDuration: 0 hour 2 minutes"
        );
    }
}
