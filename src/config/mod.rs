//! Environment-driven configuration.
//!
//! Values come from the process environment, with a `.env` file loaded by
//! `main` through `dotenvy`. API credentials are optional at startup: a
//! missing key only disables the upstream that needs it, and requests to
//! that upstream fail with a 500 before any outbound call is made.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use tracing::warn;

use crate::sampler::{DEFAULT_ATTEMPT_TIMEOUT, DEFAULT_RETRY_BUDGET, RetryBudget};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

pub const GIANTBOMB_BASE_URL: &str = "https://www.giantbomb.com/api";
pub const RAWG_BASE_URL: &str = "https://rawg-video-games-database.p.rapidapi.com";

/// Credentials for the directly accessed upstream
#[derive(Debug, Clone)]
pub struct GiantBombConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

/// Credentials for the gateway-routed upstream
#[derive(Debug, Clone)]
pub struct RawgConfig {
    pub api_key: Option<String>,
    /// Gateway host identifier sent alongside the key
    pub api_host: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub retry_budget: RetryBudget,
    pub attempt_timeout: Duration,
    pub http_timeout: Duration,
    pub giantbomb: GiantBombConfig,
    pub rawg: RawgConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let retry_budget = match get("RETRY_BUDGET") {
            Some(raw) => RetryBudget::new(
                raw.parse()
                    .with_context(|| format!("RETRY_BUDGET must be a positive integer, got {raw}"))?,
            ),
            None => RetryBudget::new(DEFAULT_RETRY_BUDGET),
        };

        let attempt_timeout = parse_secs(get("ATTEMPT_TIMEOUT_SECS"), "ATTEMPT_TIMEOUT_SECS")?
            .unwrap_or(DEFAULT_ATTEMPT_TIMEOUT);
        if attempt_timeout.is_zero() {
            bail!("ATTEMPT_TIMEOUT_SECS must be at least 1 second");
        }
        let http_timeout =
            parse_secs(get("HTTP_TIMEOUT_SECS"), "HTTP_TIMEOUT_SECS")?.unwrap_or(DEFAULT_HTTP_TIMEOUT);

        let config = Self {
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            retry_budget,
            attempt_timeout,
            http_timeout,
            giantbomb: GiantBombConfig {
                api_key: get("GIANTBOMB_API_KEY"),
                base_url: get("GIANTBOMB_BASE_URL")
                    .unwrap_or_else(|| GIANTBOMB_BASE_URL.to_string()),
            },
            rawg: RawgConfig {
                api_key: get("RAWG_API_KEY"),
                api_host: get("RAWG_API_HOST"),
                base_url: get("RAWG_BASE_URL").unwrap_or_else(|| RAWG_BASE_URL.to_string()),
            },
        };

        if config.giantbomb.api_key.is_none() {
            warn!("GIANTBOMB_API_KEY not set - /api/giantbomb will answer with errors");
        }
        if config.rawg.api_key.is_none() || config.rawg.api_host.is_none() {
            warn!("RAWG_API_KEY or RAWG_API_HOST not set - /api/rawg will answer with errors");
        }

        Ok(config)
    }
}

fn parse_secs(raw: Option<String>, key: &str) -> Result<Option<Duration>> {
    raw.map(|raw| {
        raw.parse::<u64>()
            .map(Duration::from_secs)
            .with_context(|| format!("{key} must be a number of seconds, got {raw}"))
    })
    .transpose()
}
