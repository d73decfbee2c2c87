// src/core/mod.rs
//! Configuration, HTTP fetching and persistence shared by the pipeline

pub mod config_manager;
pub mod database;
pub mod fetcher;

pub use config_manager::ConfigManager;
pub use database::{Database, JobRecord, JobRepository};
pub use fetcher::Fetcher;
