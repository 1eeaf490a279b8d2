// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod adjustment;
pub mod listing;
pub mod ranking;
pub mod roster;
pub mod totals;

pub use activity::{ActivityPage, ActivityRecord, ParsedEntry, ParsedPage};
pub use adjustment::{Adjustment, AdjustmentFilter, NewAdjustment};
pub use listing::{
    PersonalListingData, PersonalListingPage, RaceMember, TeamListingData, TeamListingPage,
};
pub use ranking::{DailyEntry, TeamAggregate, TeamMemberKm, TeamSortKey, WeeklyEntry};
pub use roster::{Roster, RosterEntry};
pub use totals::{DailyTotal, DayBucket, PeriodTotal, StopReason, WalkResult};
