// src/core/config_manager.rs
//! Configuration loading from the process environment (and `.env`)

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::info;

use crate::utils::split_list;

const DEFAULT_DATABASE_PATH: &str = "jobs.db";
const DEFAULT_ORS_API_URL: &str = "https://api.openrouteservice.org";
const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub search: SearchConfig,
    pub geo: GeoConfig,
    pub telegram: TelegramConfig,
    pub database_path: PathBuf,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Site root including protocol, e.g. `https://www.jobs.nhs.uk`
    pub domain: String,
    pub keywords: Vec<String>,
    pub pay_ranges: Vec<PayRange>,
}

#[derive(Debug, Clone)]
pub struct GeoConfig {
    pub api_key: String,
    pub base_url: String,
    pub origin_address: String,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub base_url: String,
}

/// A `low-high` salary band used as the `payRange` search filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayRange {
    pub low: u32,
    pub high: u32,
}

impl FromStr for PayRange {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (low, high) = s
            .trim()
            .split_once('-')
            .with_context(|| format!("Pay range '{}' must look like low-high", s))?;
        let low = low
            .trim()
            .parse()
            .with_context(|| format!("Invalid lower bound in pay range '{}'", s))?;
        let high = high
            .trim()
            .parse()
            .with_context(|| format!("Invalid upper bound in pay range '{}'", s))?;
        if low > high {
            anyhow::bail!("Pay range '{}' has its bounds reversed", s);
        }
        Ok(Self { low, high })
    }
}

impl fmt::Display for PayRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

impl ConfigManager {
    /// Load `env_file` (if present) and read configuration from the environment
    pub fn load(env_file: &Path) -> Result<Self> {
        if env_file.exists() {
            dotenvy::from_path(env_file)
                .with_context(|| format!("Failed to read {}", env_file.display()))?;
            info!("Loaded environment from {}", env_file.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str, hint: &str| -> Result<String> {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .with_context(|| format!("Missing {} ({})", key, hint))
        };

        let api_key = required("OSM_TOKEN", "token for openrouteservice")?;
        let token = required("TELEGRAM_TOKEN", "token for telegram")?;
        let chat_id = required("CHANNEL_ID", "channel id for telegram")?;
        let keywords = split_list(&required(
            "KEYWORDS",
            "keywords list to search, comma separated",
        )?);
        let pay_ranges = split_list(&required(
            "PAY_RANGES",
            "pay ranges list to search, comma separated, ie 30-40,40-50",
        )?)
        .iter()
        .map(|range| range.parse::<PayRange>())
        .collect::<Result<Vec<_>>>()?;
        let domain = Self::parse_domain(&required(
            "DOMAIN",
            "usually https://www.jobs.nhs.uk, include protocol",
        )?)?;
        let origin_address = required(
            "ORIGIN_ADDRESS",
            "origin address, this can be any address in the UK",
        )?;

        if keywords.is_empty() {
            anyhow::bail!("KEYWORDS must contain at least one keyword");
        }
        if pay_ranges.is_empty() {
            anyhow::bail!("PAY_RANGES must contain at least one range");
        }

        let optional = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let timeout_seconds = optional("HTTP_TIMEOUT_SECS", &DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .context("HTTP_TIMEOUT_SECS must be a whole number of seconds")?;

        let config = Self {
            search: SearchConfig {
                domain,
                keywords,
                pay_ranges,
            },
            geo: GeoConfig {
                api_key,
                base_url: optional("ORS_API_URL", DEFAULT_ORS_API_URL)
                    .trim_end_matches('/')
                    .to_string(),
                origin_address,
            },
            telegram: TelegramConfig {
                token,
                chat_id,
                base_url: optional("TELEGRAM_API_URL", DEFAULT_TELEGRAM_API_URL)
                    .trim_end_matches('/')
                    .to_string(),
            },
            database_path: PathBuf::from(optional("DATABASE_PATH", DEFAULT_DATABASE_PATH)),
            timeout_seconds,
        };

        info!(
            "Configuration loaded: {} keywords, {} pay ranges, domain {}",
            config.search.keywords.len(),
            config.search.pay_ranges.len(),
            config.search.domain
        );
        Ok(config)
    }

    /// Override the database location (command line takes precedence)
    pub fn with_database_path(mut self, path: PathBuf) -> Self {
        self.database_path = path;
        self
    }

    fn parse_domain(raw: &str) -> Result<String> {
        let url = reqwest::Url::parse(raw)
            .with_context(|| format!("DOMAIN '{}' is not an absolute URL", raw))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("DOMAIN '{}' must use http or https", raw);
        }
        Ok(raw.trim_end_matches('/').to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("OSM_TOKEN", "ors-key"),
            ("TELEGRAM_TOKEN", "123:abc"),
            ("CHANNEL_ID", "-100200"),
            ("KEYWORDS", "nurse, healthcare assistant"),
            ("PAY_RANGES", "20-30,30-40"),
            ("DOMAIN", "https://www.jobs.nhs.uk/"),
            ("ORIGIN_ADDRESS", "10 Downing Street, London"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<ConfigManager> {
        ConfigManager::from_lookup(|key| env.get(key).map(|v| v.to_string()))
    }

    #[test]
    fn test_load_full_config() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.search.domain, "https://www.jobs.nhs.uk");
        assert_eq!(
            config.search.keywords,
            vec!["nurse", "healthcare assistant"]
        );
        assert_eq!(
            config.search.pay_ranges,
            vec![
                PayRange { low: 20, high: 30 },
                PayRange { low: 30, high: 40 }
            ]
        );
        assert_eq!(config.database_path, PathBuf::from("jobs.db"));
        assert_eq!(config.geo.base_url, DEFAULT_ORS_API_URL);
        assert_eq!(config.telegram.base_url, DEFAULT_TELEGRAM_API_URL);
        assert_eq!(config.timeout_seconds, 30);
    }

    #[test]
    fn test_missing_variable_is_fatal() {
        for key in [
            "OSM_TOKEN",
            "TELEGRAM_TOKEN",
            "CHANNEL_ID",
            "KEYWORDS",
            "PAY_RANGES",
            "DOMAIN",
            "ORIGIN_ADDRESS",
        ] {
            let mut env = base_env();
            env.remove(key);
            let err = load(&env).unwrap_err();
            assert!(err.to_string().contains(key), "{}", err);

            let mut env = base_env();
            env.insert(key, "   ");
            assert!(load(&env).is_err(), "blank {} accepted", key);
        }
    }

    #[test]
    fn test_domain_must_be_absolute() {
        let mut env = base_env();
        env.insert("DOMAIN", "www.jobs.nhs.uk");
        assert!(load(&env).is_err());
    }

    #[test]
    fn test_pay_range_parsing() {
        assert_eq!(
            "40-50".parse::<PayRange>().unwrap(),
            PayRange { low: 40, high: 50 }
        );
        assert_eq!(PayRange { low: 40, high: 50 }.to_string(), "40-50");
        assert!("40".parse::<PayRange>().is_err());
        assert!("a-b".parse::<PayRange>().is_err());
        assert!("50-40".parse::<PayRange>().is_err());
    }

    #[test]
    fn test_optional_overrides() {
        let mut env = base_env();
        env.insert("DATABASE_PATH", "/var/lib/jobs/jobs.db");
        env.insert("ORS_API_URL", "http://127.0.0.1:9000/");
        env.insert("HTTP_TIMEOUT_SECS", "5");
        let config = load(&env).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/jobs/jobs.db"));
        assert_eq!(config.geo.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.timeout_seconds, 5);

        let config = config.with_database_path(PathBuf::from("other.db"));
        assert_eq!(config.database_path, PathBuf::from("other.db"));
    }

    #[test]
    fn test_load_reads_env_file() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join(".env");
        let contents: String = base_env()
            .iter()
            .map(|(key, value)| format!("{}=\"{}\"\n", key, value))
            .collect();
        std::fs::write(&env_file, contents).unwrap();

        let config = ConfigManager::load(&env_file).unwrap();
        assert_eq!(config.search.domain, "https://www.jobs.nhs.uk");
        assert_eq!(config.telegram.chat_id, "-100200");
    }
}
