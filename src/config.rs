use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::risk::AggregateUserRiskConfig;

pub const DEFAULT_RESEARCH_TIMEOUT_SECS: u64 = 10;

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Research backend; export and feedback stay local when unset.
    pub research_api_url: Option<Url>,
    pub research_timeout: Duration,
    pub aggregate: AggregateUserRiskConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            research_api_url: None,
            research_timeout: Duration::from_secs(DEFAULT_RESEARCH_TIMEOUT_SECS),
            aggregate: AggregateUserRiskConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let research_api_url = lookup("RESEARCH_API_URL")
            .filter(|v| !v.trim().is_empty())
            .map(|v| {
                v.trim()
                    .parse::<Url>()
                    .with_context(|| format!("Invalid RESEARCH_API_URL: {}", v))
            })
            .transpose()?;

        let research_timeout = match lookup("RESEARCH_API_TIMEOUT_SECS") {
            Some(v) => Duration::from_secs(
                v.trim()
                    .parse()
                    .with_context(|| format!("Invalid RESEARCH_API_TIMEOUT_SECS: {}", v))?,
            ),
            None => Duration::from_secs(DEFAULT_RESEARCH_TIMEOUT_SECS),
        };

        let aggregate = match lookup("AGGREGATE_CONFIG_PATH") {
            Some(path) => load_aggregate_config(PathBuf::from(path))?,
            None => AggregateUserRiskConfig::default(),
        };

        Ok(Self {
            research_api_url,
            research_timeout,
            aggregate,
        })
    }
}

/// Reads aggregator tuning from a JSON file. Missing fields keep their
/// defaults.
pub fn load_aggregate_config<P: AsRef<Path>>(path: P) -> Result<AggregateUserRiskConfig> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read aggregate config {}", path.display()))?;

    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse aggregate config {}", path.display()))
}
