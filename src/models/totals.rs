// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-day and per-period distance totals.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::ActivityRecord;
use crate::time_utils::days_inclusive;

/// Valid and violation km accumulated for one day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayBucket {
    pub valid: f64,
    pub violation: f64,
}

/// Why a pagination walk stopped.
#[derive(Debug, Clone, PartialEq)]
pub enum StopReason {
    /// Upstream returned a page without entries
    EmptyPage,
    /// The last entry on a page was older than the window start
    PastWindow,
    /// A non-empty page had no entry with a readable date
    NoParseableDates,
    /// A page after the first failed to load
    FetchFailed(String),
    /// The configured page ceiling was reached
    PageLimit,
}

/// Raw accumulation produced by walking one participant's feed.
#[derive(Debug, Clone, PartialEq)]
pub struct WalkResult {
    pub participant_id: u64,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate,
    pub valid_km: f64,
    pub violation_km: f64,
    /// Seeded with every day of the window
    pub daily: BTreeMap<NaiveDate, DayBucket>,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

impl WalkResult {
    pub fn new(participant_id: u64, window_start: NaiveDate, window_end: NaiveDate) -> Self {
        let daily = days_inclusive(window_start, window_end)
            .into_iter()
            .map(|d| (d, DayBucket::default()))
            .collect();
        Self {
            participant_id,
            window_start,
            window_end,
            valid_km: 0.0,
            violation_km: 0.0,
            daily,
            pages_fetched: 0,
            stop: StopReason::EmptyPage,
        }
    }

    /// Accumulate a record if its day falls inside the window (both ends inclusive).
    ///
    /// Returns `true` if the record was counted.
    pub fn record(&mut self, activity: &ActivityRecord) -> bool {
        if activity.date < self.window_start || activity.date > self.window_end {
            return false;
        }

        let bucket = self.daily.entry(activity.date).or_default();
        if activity.is_violation {
            bucket.violation += activity.distance_km;
            self.violation_km += activity.distance_km;
        } else {
            bucket.valid += activity.distance_km;
            self.valid_km += activity.distance_km;
        }
        true
    }
}

/// One day of a period breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DailyTotal {
    pub date: NaiveDate,
    /// Valid km for the day
    #[serde(rename = "km")]
    pub valid_km: f64,
    pub violation_km: f64,
}

/// Folded distance for one participant over an inclusive date window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct PeriodTotal {
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub participant_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Counted km (after adjustment, floored at zero)
    pub total_km: f64,
    /// Valid km before any adjustment
    pub original_km: f64,
    pub violation_km: f64,
    pub daily_breakdown: Vec<DailyTotal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_km: Option<f64>,
}

impl PeriodTotal {
    /// All-zero total for a participant whose feed could not be read.
    pub fn zeroed(participant_id: u64, dates: &[NaiveDate]) -> Self {
        let (start_date, end_date) = window_bounds(dates);
        Self {
            participant_id,
            start_date,
            end_date,
            total_km: 0.0,
            original_km: 0.0,
            violation_km: 0.0,
            daily_breakdown: dates
                .iter()
                .map(|&date| DailyTotal {
                    date,
                    valid_km: 0.0,
                    violation_km: 0.0,
                })
                .collect(),
            adjustment_km: None,
        }
    }
}

fn window_bounds(dates: &[NaiveDate]) -> (NaiveDate, NaiveDate) {
    match (dates.first(), dates.last()) {
        (Some(&first), Some(&last)) => (first, last),
        _ => (NaiveDate::default(), NaiveDate::default()),
    }
}
