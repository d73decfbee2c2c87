// src/core/database.rs
//! SQLite persistence of processed jobs (the dedup store)

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use std::path::Path;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::utils::normalize_job_path;

// ===== Connection Management =====

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the database file and run migrations
    pub async fn new(database_path: &Path) -> Result<Self> {
        if let Some(parent) = database_path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.with_context(|| {
                    format!("Failed to create database directory: {}", parent.display())
                })?;
            }
        }

        let database_url = format!("sqlite:{}?mode=rwc", database_path.display());
        let pool = SqlitePool::connect(&database_url).await.with_context(|| {
            format!("Failed to connect to database: {}", database_path.display())
        })?;

        info!(
            "Database connection established: {}",
            database_path.display()
        );

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    pub fn jobs(&self) -> JobRepository<'_> {
        JobRepository::new(&self.pool)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS records (
                path TEXT UNIQUE,
                salary VARCHAR(1000),
                title VARCHAR(1000),
                address VARCHAR(1000),
                distance VARCHAR(1000)
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create records table")?;

        info!("Database migrations completed");
        Ok(())
    }

    /// Release all pooled connections
    pub async fn close(self) {
        self.pool.close().await;
        debug!("Database connection closed");
    }
}

// ===== Job Models =====

/// A processed job posting, keyed by its normalized path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRecord {
    pub path: String,
    pub salary: String,
    pub title: String,
    pub address: String,
    pub distance: String,
}

// ===== Job Repository =====

pub struct JobRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> JobRepository<'a> {
    pub fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether a job with this path (query string ignored) was already processed
    pub async fn exists(&self, path: &str) -> Result<bool, StoreError> {
        let path = normalize_job_path(path);
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM records WHERE path = ?")
            .bind(path)
            .fetch_optional(self.pool)
            .await?;
        Ok(found.is_some())
    }

    /// Insert a record unless its path is already present.
    ///
    /// Existence is re-checked inside the write transaction; a unique violation
    /// raised by a concurrent writer is reported as `AlreadyExists` too.
    pub async fn insert(&self, record: &JobRecord) -> Result<(), StoreError> {
        let path = normalize_job_path(&record.path);
        let mut tx = self.pool.begin().await?;

        let existing: Option<i64> = sqlx::query_scalar("SELECT 1 FROM records WHERE path = ?")
            .bind(path)
            .fetch_optional(&mut *tx)
            .await?;
        if existing.is_some() {
            tx.rollback().await?;
            return Err(StoreError::AlreadyExists(path.to_string()));
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO records (path, salary, title, address, distance)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(path)
        .bind(&record.salary)
        .bind(&record.title)
        .bind(&record.address)
        .bind(&record.distance)
        .execute(&mut *tx)
        .await;

        match inserted {
            Ok(_) => {}
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                return Err(StoreError::AlreadyExists(path.to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        tx.commit().await?;
        info!("Record with path '{}' inserted", path);
        Ok(())
    }

    /// Number of jobs processed so far, across all runs
    pub async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM records")
            .fetch_one(self.pool)
            .await?;
        Ok(count)
    }
}
