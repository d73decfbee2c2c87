// src/scraping/search_parser.rs
use scraper::{Html, Selector};
use tracing::debug;

use super::{select_text, SearchPage};

const RESULT_LINK_SELECTOR: &str = r#"a[data-test="search-result-job-title"]"#;
const PAGINATION_SELECTOR: &str = "span.nhsuk-pagination__page";

/// Extract job links and the page count from a search results page
pub fn parse_search_page(html: &str) -> SearchPage {
    let document = Html::parse_document(html);

    let links = match Selector::parse(RESULT_LINK_SELECTOR) {
        Ok(selector) => document
            .select(&selector)
            .filter_map(|a| a.value().attr("href"))
            .map(str::to_string)
            .collect(),
        Err(_) => Vec::new(),
    };

    let max_page = select_text(&document, PAGINATION_SELECTOR)
        .as_deref()
        .and_then(parse_page_count);

    debug!("Search page: {} links, max page {:?}", links.len(), max_page);
    SearchPage { links, max_page }
}

/// `"Page 2 of 14"` -> `14`
fn parse_page_count(indicator: &str) -> Option<u32> {
    let (_, total) = indicator.split_once("of")?;
    total.trim().parse().ok()
}
