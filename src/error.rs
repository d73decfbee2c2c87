// src/error.rs
//! Error types for the crawl pipeline.
//!
//! - `FetchError`: the job site could not be read
//! - `ExtractionError`: a page did not have the expected markup
//! - `GeoError`: geocoding/routing failed (recovered locally, never surfaced)
//! - `NotifyError`: the message could not be delivered
//! - `StoreError`: persistence failed, or the job was already recorded
//! - `JobError`: any of the above, for a single job

use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Response not ok ({status}) for {url}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// HTTP status of the failed response, when one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Field of a job detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Salary,
    Title,
    Address,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Salary => "salary",
            Self::Title => "title",
            Self::Address => "address",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("{field} not found")]
pub struct ExtractionError {
    pub field: Field,
}

impl ExtractionError {
    pub fn new(field: Field) -> Self {
        Self { field }
    }
}

#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Geo API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("No location found for: {0}")]
    NoMatch(String),

    #[error("No route returned between origin and destination")]
    NoRoute,

    #[error("Geo API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Messaging API error ({status}): {description}")]
    Api { status: u16, description: String },

    #[error("Still rate limited after waiting {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("Messaging API request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Record with path '{0}' already exists")]
    AlreadyExists(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Failure of one job in the per-job pipeline
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Notify(#[from] NotifyError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
