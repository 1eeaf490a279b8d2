// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race site client.
//!
//! Handles:
//! - Activity feed pages (HTML fragments, one POST per page)
//! - Base personal / team ranking listings (JSON API)
//! - A global bound on concurrent upstream requests
//!
//! Nothing here retries. Callers decide what a failure means.

use crate::config::Config;
use crate::models::{ActivityPage, PersonalListingPage, TeamListingPage};
use crate::services::parser::{ActivityPageParser, HtmlActivityParser};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Semaphore;

const FEED_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";
const LISTING_USER_AGENT: &str = "okhttp/5.0.0-alpha.14";

/// Why an upstream call produced nothing usable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchFailure {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("unreadable response: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchFailure::Timeout
        } else if err.is_decode() {
            FetchFailure::Body(err.to_string())
        } else {
            FetchFailure::Network(err.to_string())
        }
    }
}

/// Source of per-participant activity feed pages.
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Fetch page `page` (1-based) of a participant's feed, newest first.
    async fn fetch_activity_page(
        &self,
        participant_id: u64,
        page: u32,
    ) -> Result<ActivityPage, FetchFailure>;
}

/// Source of the upstream base rankings.
#[async_trait]
pub trait RaceListing: Send + Sync {
    async fn personal_page(&self, page: u32) -> Result<PersonalListingPage, FetchFailure>;
    async fn team_page(&self, page: u32) -> Result<TeamListingPage, FetchFailure>;
}

/// HTTP client for the race site.
#[derive(Clone)]
pub struct RaceClient {
    http: reqwest::Client,
    base_url: String,
    race_id: String,
    client_token: String,
    parser: Arc<dyn ActivityPageParser>,
    /// Shared by every request this client makes
    permits: Arc<Semaphore>,
}

impl RaceClient {
    /// Create a client from configuration with the default HTML parser.
    pub fn new(config: &Config) -> Result<Self, FetchFailure> {
        Self::with_parser(config, Arc::new(HtmlActivityParser))
    }

    pub fn with_parser(
        config: &Config,
        parser: Arc<dyn ActivityPageParser>,
    ) -> Result<Self, FetchFailure> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.upstream_base_url.trim_end_matches('/').to_string(),
            race_id: config.race_id.clone(),
            client_token: config.upstream_client_token.clone(),
            parser,
            permits: Arc::new(Semaphore::new(config.max_concurrent_upstream.max(1))),
        })
    }

    /// Generic GET against the JSON listing API.
    async fn get_listing<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchFailure> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchFailure::Network("client shut down".to_string()))?;

        let url = format!("{}/api/v1/races/detail/{}/{}", self.base_url, self.race_id, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .header("User-Agent", LISTING_USER_AGENT)
            .header("x-ap", &self.client_token)
            .send()
            .await?;

        let response = check_status(response)?;
        response.json().await.map_err(|e| FetchFailure::Body(e.to_string()))
    }
}

/// Return the response if successful, otherwise a `Status` failure.
fn check_status(response: reqwest::Response) -> Result<reqwest::Response, FetchFailure> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status.as_u16() == 429 {
        tracing::warn!("Race site rate limit hit (429)");
    }
    Err(FetchFailure::Status(status.as_u16()))
}

#[async_trait]
impl ActivitySource for RaceClient {
    async fn fetch_activity_page(
        &self,
        participant_id: u64,
        page: u32,
    ) -> Result<ActivityPage, FetchFailure> {
        if page == 0 {
            return Err(FetchFailure::InvalidRequest(
                "page numbers start at 1".to_string(),
            ));
        }

        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchFailure::Network("client shut down".to_string()))?;

        let url = format!(
            "{}/personal/get_data_post/activities/{}",
            self.base_url, participant_id
        );
        let response = self
            .http
            .post(&url)
            .header("Accept", "text/html, */*; q=0.01")
            .header("Origin", self.base_url.as_str())
            .header("Referer", format!("{}/member/{}", self.base_url, participant_id))
            .header("User-Agent", FEED_USER_AGENT)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(&[("page", page.to_string()), ("listCateId", String::new())])
            .send()
            .await?;

        let markup = check_status(response)?
            .text()
            .await
            .map_err(|e| FetchFailure::Body(e.to_string()))?;

        let page_data = self.parser.parse(&markup).into_page(participant_id);
        tracing::debug!(
            participant_id,
            page,
            entries = page_data.entry_count,
            dated = page_data.activities.len(),
            "Fetched activity page"
        );
        Ok(page_data)
    }
}

#[async_trait]
impl RaceListing for RaceClient {
    async fn personal_page(&self, page: u32) -> Result<PersonalListingPage, FetchFailure> {
        self.get_listing(&format!("ranking_personal/{}", page), &[])
            .await
    }

    async fn team_page(&self, page: u32) -> Result<TeamListingPage, FetchFailure> {
        self.get_listing("ranking_team", &[("page", page.to_string())])
            .await
    }
}
