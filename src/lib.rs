// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Race leaderboard: challenge rankings computed from a race site's
//! activity feeds.
//!
//! This crate provides the backend API that walks each participant's feed,
//! folds activities into period totals, applies manual km adjustments and
//! serves daily, weekly, team and overall rankings.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::AdjustmentStore;
use services::LeaderboardService;
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub leaderboard: LeaderboardService,
    pub adjustments: Arc<dyn AdjustmentStore>,
}
