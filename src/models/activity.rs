// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Scraped activity records and activity feed pages.

use chrono::NaiveDate;

/// One scraped unit of distance for a participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub participant_id: u64,
    /// Calendar day as displayed by the upstream site
    pub date: NaiveDate,
    /// Distance in kilometres (zero when the distance text had no number)
    pub distance_km: f64,
    /// Flagged by upstream moderation; never counted toward totals
    pub is_violation: bool,
}

/// An activity entry extracted from markup, before it is tied to a participant.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedEntry {
    pub date: NaiveDate,
    pub distance_km: f64,
    pub is_violation: bool,
}

/// Result of parsing one feed page.
///
/// `entry_count` counts every activity entry found in the markup, including
/// entries that were skipped because their date could not be parsed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPage {
    pub entries: Vec<ParsedEntry>,
    pub entry_count: usize,
}

impl ParsedPage {
    /// Attach the participant ID to every parsed entry.
    pub fn into_page(self, participant_id: u64) -> ActivityPage {
        ActivityPage {
            activities: self
                .entries
                .into_iter()
                .map(|e| ActivityRecord {
                    participant_id,
                    date: e.date,
                    distance_km: e.distance_km,
                    is_violation: e.is_violation,
                })
                .collect(),
            entry_count: self.entry_count,
        }
    }
}

/// One page of a participant's activity feed (newest first).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityPage {
    pub activities: Vec<ActivityRecord>,
    pub entry_count: usize,
}

impl ActivityPage {
    /// True when the page held no activity entries at all.
    pub fn is_empty(&self) -> bool {
        self.entry_count == 0
    }

    /// Date of the last dated entry on the page, in feed order.
    ///
    /// The feed is reverse-chronological, so this is the oldest day the page reached.
    pub fn last_seen_date(&self) -> Option<NaiveDate> {
        self.activities.last().map(|a| a.date)
    }
}
