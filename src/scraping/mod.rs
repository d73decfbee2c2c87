// src/scraping/mod.rs
use scraper::{Html, Selector};

pub mod job_parser;
pub mod search_parser;

pub use job_parser::parse_job_fields;
pub use search_parser::parse_search_page;

/// Links and pagination found on one search results page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    /// Job detail links (path plus query string) in document order
    pub links: Vec<String>,
    /// Last page number, when the pagination indicator was present
    pub max_page: Option<u32>,
}

/// Fields extracted from a job detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobFields {
    pub title: String,
    pub salary: String,
    pub address: String,
}

/// First element matching `selector`, as its concatenated text
pub(crate) fn select_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>())
}
