// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Manual km corrections entered by administrators.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::time_utils::format_utc_rfc3339;

/// Stored km adjustment.
///
/// Several adjustments may exist for the same participant and day; they are summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Adjustment {
    /// `{bib}-{date}-{unix_millis}`
    pub id: String,
    /// Participant ID the correction applies to
    #[cfg_attr(feature = "binding-generation", ts(type = "number"))]
    pub bib_number: u64,
    pub date: NaiveDate,
    /// Signed km delta
    pub adjustment_km: f64,
    #[serde(default)]
    pub reason: String,
    /// Creation time (RFC3339)
    pub created_at: String,
}

/// Fields supplied when creating an adjustment.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAdjustment {
    pub bib_number: u64,
    pub date: NaiveDate,
    pub adjustment_km: f64,
    pub reason: String,
}

impl Adjustment {
    pub fn from_new(new: NewAdjustment, now: DateTime<Utc>) -> Self {
        Self {
            id: format!("{}-{}-{}", new.bib_number, new.date, now.timestamp_millis()),
            bib_number: new.bib_number,
            date: new.date,
            adjustment_km: new.adjustment_km,
            reason: new.reason,
            created_at: format_utc_rfc3339(now),
        }
    }
}

/// Filter for listing adjustments. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjustmentFilter {
    pub date: Option<NaiveDate>,
    /// Inclusive `(start, end)` day range
    pub range: Option<(NaiveDate, NaiveDate)>,
    pub bib_number: Option<u64>,
}

impl AdjustmentFilter {
    pub fn for_range(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            range: Some((start, end)),
            ..Self::default()
        }
    }

    pub fn matches(&self, adjustment: &Adjustment) -> bool {
        self.date.map_or(true, |d| adjustment.date == d)
            && self
                .range
                .map_or(true, |(start, end)| adjustment.date >= start && adjustment.date <= end)
            && self.bib_number.map_or(true, |b| adjustment.bib_number == b)
    }
}
