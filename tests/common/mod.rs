// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use chrono::NaiveDate;
use race_leaderboard::config::Config;
use race_leaderboard::db::{AdjustmentStore, MemoryAdjustmentStore};
use race_leaderboard::models::{
    ActivityPage, ActivityRecord, PersonalListingPage, Roster, RosterEntry, TeamListingPage,
};
use race_leaderboard::routes::create_router;
use race_leaderboard::services::{
    ActivitySource, FetchFailure, LeaderboardService, RaceListing, StaticRoster,
};
use race_leaderboard::AppState;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[allow(dead_code)]
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
}

/// One activity for `participant_id`.
#[allow(dead_code)]
pub fn run(participant_id: u64, date: NaiveDate, km: f64) -> ActivityRecord {
    ActivityRecord {
        participant_id,
        date,
        distance_km: km,
        is_violation: false,
    }
}

#[allow(dead_code)]
pub fn flagged(participant_id: u64, date: NaiveDate, km: f64) -> ActivityRecord {
    ActivityRecord {
        is_violation: true,
        ..run(participant_id, date, km)
    }
}

/// Scripted activity feeds keyed by participant.
#[derive(Default)]
pub struct FakeFeed {
    pages: HashMap<u64, Vec<Vec<ActivityRecord>>>,
    failing: HashSet<u64>,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl FakeFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed pages for a participant, newest first.
    pub fn with_pages(mut self, participant_id: u64, pages: Vec<Vec<ActivityRecord>>) -> Self {
        self.pages.insert(participant_id, pages);
        self
    }

    pub fn failing(mut self, participant_id: u64) -> Self {
        self.failing.insert(participant_id);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ActivitySource for FakeFeed {
    async fn fetch_activity_page(
        &self,
        participant_id: u64,
        page: u32,
    ) -> Result<ActivityPage, FetchFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(&participant_id) {
            return Err(FetchFailure::Status(503));
        }
        let activities = self
            .pages
            .get(&participant_id)
            .and_then(|pages| pages.get(page as usize - 1))
            .cloned()
            .unwrap_or_default();
        Ok(ActivityPage {
            entry_count: activities.len(),
            activities,
        })
    }
}

/// Canned upstream listings. Missing pages fail with HTTP 500.
#[derive(Default)]
pub struct FakeListing {
    pub personal: HashMap<u32, PersonalListingPage>,
    pub teams: HashMap<u32, TeamListingPage>,
}

#[async_trait]
impl RaceListing for FakeListing {
    async fn personal_page(&self, page: u32) -> Result<PersonalListingPage, FetchFailure> {
        self.personal
            .get(&page)
            .cloned()
            .ok_or(FetchFailure::Status(500))
    }

    async fn team_page(&self, page: u32) -> Result<TeamListingPage, FetchFailure> {
        self.teams.get(&page).cloned().ok_or(FetchFailure::Status(500))
    }
}

#[allow(dead_code)]
pub fn roster_entry(member_id: u64, team: Option<&str>, ban: bool) -> RosterEntry {
    RosterEntry {
        name: format!("Runner {}", member_id),
        member_id: member_id.to_string(),
        team_name: team.map(str::to_string),
        gender: "F".to_string(),
        strava_id: None,
        ban,
    }
}

/// Test dependencies; swap any of them before calling [`TestDeps::build`].
pub struct TestDeps {
    pub config: Config,
    pub feed: Arc<FakeFeed>,
    pub listing: Arc<FakeListing>,
    pub roster: Roster,
    pub store: Arc<dyn AdjustmentStore>,
}

impl Default for TestDeps {
    fn default() -> Self {
        Self {
            config: Config {
                challenge_start: day(1),
                challenge_end: Some(day(31)),
                ..Config::default()
            },
            feed: Arc::new(FakeFeed::new()),
            listing: Arc::new(FakeListing::default()),
            roster: Roster::default(),
            store: Arc::new(MemoryAdjustmentStore::new()),
        }
    }
}

#[allow(dead_code)]
impl TestDeps {
    pub fn build(self) -> (axum::Router, Arc<AppState>) {
        let leaderboard = LeaderboardService::new(
            &self.config,
            self.feed,
            self.listing,
            Arc::new(StaticRoster::new(self.roster)),
            self.store.clone(),
        );
        let state = Arc::new(AppState {
            config: self.config,
            leaderboard,
            adjustments: self.store,
        });
        (create_router(state.clone()), state)
    }
}

/// Create a test app with empty fakes.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    TestDeps::default().build()
}

#[allow(dead_code)]
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[allow(dead_code)]
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[allow(dead_code)]
pub async fn body_json(response: Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}
