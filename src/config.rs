// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.

use crate::time_utils::parse_day;
use chrono::NaiveDate;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Which backend holds km adjustments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentBackend {
    Memory,
    Firestore,
}

impl FromStr for AdjustmentBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "firestore" => Ok(Self::Firestore),
            _ => Err(ConfigError::Invalid("ADJUSTMENT_STORE")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Dashboard URL allowed by CORS
    pub frontend_url: String,

    // --- Upstream race site ---
    /// Base URL of the race platform (no trailing slash)
    pub upstream_base_url: String,
    /// Race identifier used by the JSON listing endpoints
    pub race_id: String,
    /// Fixed client identity token sent with listing requests
    pub upstream_client_token: String,
    /// Per-call HTTP timeout
    pub upstream_timeout: Duration,
    /// Upper bound on in-flight upstream requests across all participants
    pub max_concurrent_upstream: usize,
    /// Walker page ceiling per participant
    pub max_pages_per_participant: u32,
    /// Pages of the team listing merged into one response
    pub team_listing_pages: u32,
    /// Hours east of UTC for upstream timestamps
    pub upstream_utc_offset_hours: i32,

    // --- Challenge ---
    pub challenge_start: NaiveDate,
    pub challenge_end: Option<NaiveDate>,
    /// Longest accepted request window, in days
    pub max_range_days: i64,

    // --- Storage ---
    pub roster_path: String,
    pub adjustment_backend: AdjustmentBackend,
    pub gcp_project_id: String,
    /// Bearer token required for adjustment writes (open when unset)
    pub admin_token: Option<String>,

    // --- Cache ---
    pub daily_cache_ttl: Duration,
    pub weekly_cache_ttl: Duration,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:3000".to_string(),
            upstream_base_url: "http://127.0.0.1:9".to_string(),
            race_id: "16790".to_string(),
            upstream_client_token: "test_client_token".to_string(),
            upstream_timeout: Duration::from_secs(2),
            max_concurrent_upstream: 4,
            max_pages_per_participant: 50,
            team_listing_pages: 2,
            upstream_utc_offset_hours: 7,
            challenge_start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            challenge_end: None,
            max_range_days: 62,
            roster_path: "data/user.json".to_string(),
            adjustment_backend: AdjustmentBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            admin_token: Some("test_admin_token".to_string()),
            daily_cache_ttl: Duration::from_secs(300),
            weekly_cache_ttl: Duration::from_secs(600),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is honoured for local development.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),

            upstream_base_url: env::var("UPSTREAM_BASE_URL")
                .unwrap_or_else(|_| "https://84race.com".to_string())
                .trim_end_matches('/')
                .to_string(),
            race_id: env::var("RACE_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("RACE_ID"))?,
            upstream_client_token: env::var("UPSTREAM_CLIENT_TOKEN")
                .map(|v| v.trim().to_string())
                .unwrap_or_default(),
            upstream_timeout: Duration::from_secs(parse_or("UPSTREAM_TIMEOUT_SECS", 15)?),
            max_concurrent_upstream: parse_or("MAX_CONCURRENT_UPSTREAM", 8)?,
            max_pages_per_participant: parse_or("MAX_PAGES_PER_PARTICIPANT", 50)?,
            team_listing_pages: parse_or("TEAM_LISTING_PAGES", 2)?,
            upstream_utc_offset_hours: parse_or("UPSTREAM_UTC_OFFSET_HOURS", 7)?,

            challenge_start: env::var("CHALLENGE_START")
                .map_err(|_| ConfigError::Missing("CHALLENGE_START"))
                .and_then(|v| parse_date("CHALLENGE_START", &v))?,
            challenge_end: env::var("CHALLENGE_END")
                .ok()
                .map(|v| parse_date("CHALLENGE_END", &v))
                .transpose()?,
            max_range_days: parse_or("MAX_RANGE_DAYS", 62)?,

            roster_path: env::var("ROSTER_PATH").unwrap_or_else(|_| "data/user.json".to_string()),
            adjustment_backend: env::var("ADJUSTMENT_STORE")
                .unwrap_or_else(|_| "memory".to_string())
                .parse()?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            admin_token: env::var("ADMIN_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),

            daily_cache_ttl: Duration::from_secs(parse_or("DAILY_CACHE_TTL_SECS", 300)?),
            weekly_cache_ttl: Duration::from_secs(parse_or("WEEKLY_CACHE_TTL_SECS", 600)?),
        })
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(name)),
        Err(_) => Ok(default),
    }
}

fn parse_date(name: &'static str, raw: &str) -> Result<NaiveDate, ConfigError> {
    parse_day(raw).ok_or(ConfigError::Invalid(name))
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
