// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ranking routes.

use crate::error::{AppError, Result};
use crate::models::{
    DailyEntry, PeriodTotal, PersonalListingPage, TeamAggregate, TeamListingPage, TeamSortKey,
    WeeklyEntry,
};
use crate::routes::{json_body, path_param, query_params};
use crate::AppState;
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/daily-km", post(daily_km))
        .route("/api/weekly-km", post(weekly_km))
        .route("/api/weekly-team-km", post(weekly_team_km))
        .route("/api/race/personal/{page}", get(personal_ranking))
        .route("/api/race/team", get(team_ranking))
        .route("/api/member/{id}", get(member_history))
}

// ─── Daily / Weekly ──────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DailyRequest {
    #[validate(length(min = 1, message = "memberIds must not be empty"))]
    pub member_ids: Vec<u64>,
    pub date: Option<NaiveDate>,
}

/// Single-day ranking. `date` defaults to today in the upstream time zone.
async fn daily_km(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<DailyRequest>, JsonRejection>,
) -> Result<Json<Vec<DailyEntry>>> {
    let body = json_body(payload)?;
    body.validate()?;

    let date = body.date.unwrap_or_else(|| state.leaderboard.today());
    tracing::info!(members = body.member_ids.len(), date = %date, "Daily ranking requested");

    Ok(Json(state.leaderboard.daily(&body.member_ids, date).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyRequest {
    #[validate(length(min = 1, message = "memberIds must not be empty"))]
    pub member_ids: Vec<u64>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

async fn weekly_km(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<WeeklyRequest>, JsonRejection>,
) -> Result<Json<Vec<WeeklyEntry>>> {
    let body = json_body(payload)?;
    body.validate()?;

    tracing::info!(
        members = body.member_ids.len(),
        start = %body.start_date,
        end = %body.end_date,
        "Weekly ranking requested"
    );
    let entries = state
        .leaderboard
        .weekly(&body.member_ids, body.start_date, body.end_date)
        .await?;
    Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyTeamRequest {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub sort_by: TeamSortKey,
}

async fn weekly_team_km(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<WeeklyTeamRequest>, JsonRejection>,
) -> Result<Json<Vec<TeamAggregate>>> {
    let body = json_body(payload)?;
    let teams = state
        .leaderboard
        .weekly_team(body.start_date, body.end_date, body.sort_by)
        .await?;
    Ok(Json(teams))
}

// ─── Upstream listings ───────────────────────────────────────

async fn personal_ranking(
    State(state): State<Arc<AppState>>,
    page: std::result::Result<Path<u32>, PathRejection>,
) -> Result<Json<PersonalListingPage>> {
    let page = path_param(page)?;
    Ok(Json(state.leaderboard.personal(page).await?))
}

async fn team_ranking(State(state): State<Arc<AppState>>) -> Result<Json<TeamListingPage>> {
    Ok(Json(state.leaderboard.teams().await?))
}

// ─── Member history ──────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberQuery {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Daily breakdown for one participant. Defaults to the challenge window.
async fn member_history(
    State(state): State<Arc<AppState>>,
    id: std::result::Result<Path<u64>, PathRejection>,
    query: std::result::Result<Query<MemberQuery>, QueryRejection>,
) -> Result<Json<PeriodTotal>> {
    let participant_id = path_param(id)?;
    if participant_id == 0 {
        return Err(AppError::BadRequest("member id must be positive".to_string()));
    }
    let query = query_params(query)?;

    let (window_start, window_end) = state.leaderboard.challenge_window();
    let start = query.start_date.unwrap_or(window_start);
    let end = query.end_date.unwrap_or(window_end);

    Ok(Json(state.leaderboard.member(participant_id, start, end).await?))
}
