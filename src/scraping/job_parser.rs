// src/scraping/job_parser.rs
use scraper::Html;
use tracing::{debug, info};

use super::{select_text, JobFields};
use crate::error::{ExtractionError, Field};
use crate::utils::collapse_blank_lines;

/// Ordered alternatives; a variant matches only if every one of its selectors does
type Variants = &'static [&'static [&'static str]];

const SALARY_VARIANTS: Variants = &[
    &["p#fixed_salary"],
    &["p#range_salary"],
    &["p#negotiable_salary"],
];

const TITLE_VARIANTS: Variants = &[&["h1.nhsuk-heading-xl.nhsuk-u-margin-bottom-2.word-wrap"]];

// address line 1, address line 2, town, county, postcode
const ADDRESS_VARIANTS: Variants = &[
    &[
        "p#employer_address_line_1_a",
        "p#employer_address_line_2_b",
        "p#employer_town_c",
        "p#employer_county_c",
        "p#employer_postcode_e",
    ],
    &[
        "p#employer_address_line_1",
        "p#employer_address_line_2",
        "p#employer_town",
        "p#employer_county",
        "p#employer_postcode",
    ],
];

/// Extract title, salary and address from a job detail page
pub fn parse_job_fields(html: &str) -> Result<JobFields, ExtractionError> {
    let document = Html::parse_document(html);

    let salary = extract_salary(&document)?;
    let title = extract_title(&document)?;
    let address = extract_address(&document)?;

    info!("Extracted job: {}", title);
    Ok(JobFields {
        title,
        salary,
        address,
    })
}

fn extract_salary(document: &Html) -> Result<String, ExtractionError> {
    first_complete_variant(document, SALARY_VARIANTS)
        .map(|parts| collapse_blank_lines(&parts.concat()))
        .ok_or(ExtractionError::new(Field::Salary))
}

fn extract_title(document: &Html) -> Result<String, ExtractionError> {
    first_complete_variant(document, TITLE_VARIANTS)
        .map(|parts| parts.concat().trim().to_string())
        .ok_or(ExtractionError::new(Field::Title))
}

fn extract_address(document: &Html) -> Result<String, ExtractionError> {
    first_complete_variant(document, ADDRESS_VARIANTS)
        .map(|lines| {
            lines
                .iter()
                .map(|line| line.trim())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .ok_or(ExtractionError::new(Field::Address))
}

fn first_complete_variant(document: &Html, variants: Variants) -> Option<Vec<String>> {
    for (index, selectors) in variants.iter().enumerate() {
        let texts: Option<Vec<String>> = selectors
            .iter()
            .map(|selector| select_text(document, selector))
            .collect();
        if let Some(texts) = texts {
            debug!("Matched variant {} ({})", index, selectors[0]);
            return Some(texts);
        }
    }
    None
}
