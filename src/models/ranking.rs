// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Ranked output rows for the leaderboard views.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::PeriodTotal;

/// Daily view row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyEntry {
    pub rank: u32,
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub participant_id: u64,
    pub date: NaiveDate,
    /// Counted km after adjustment
    pub km: f64,
    /// Valid km before adjustment
    pub original_km: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_km: Option<f64>,
    pub violation_km: f64,
}

impl From<PeriodTotal> for DailyEntry {
    fn from(total: PeriodTotal) -> Self {
        Self {
            rank: 0,
            participant_id: total.participant_id,
            date: total.start_date,
            km: total.total_km,
            original_km: total.original_km,
            adjustment_km: total.adjustment_km,
            violation_km: total.violation_km,
        }
    }
}

/// Weekly personal view row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct WeeklyEntry {
    pub rank: u32,
    #[serde(flatten)]
    pub total: PeriodTotal,
}

impl From<PeriodTotal> for WeeklyEntry {
    fn from(total: PeriodTotal) -> Self {
        Self { rank: 0, total }
    }
}

/// A member's contribution inside a team aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TeamMemberKm {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub participant_id: u64,
    pub member_name: String,
    pub km: f64,
}

/// Weekly team view row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TeamAggregate {
    pub rank: u32,
    pub team_name: String,
    /// Sum of member counted km
    pub total_km: f64,
    pub member_count: u32,
    pub avg_km: f64,
    /// Sorted by km, highest first
    pub members: Vec<TeamMemberKm>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Ordering key for the team view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TeamSortKey {
    #[default]
    TotalKm,
    AvgKm,
}

impl TeamSortKey {
    pub fn value(self, team: &TeamAggregate) -> f64 {
        match self {
            TeamSortKey::TotalKm => team.total_km,
            TeamSortKey::AvgKm => team.avg_km,
        }
    }
}
