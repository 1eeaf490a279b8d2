// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Folds walk results into period totals, fanning out over participants.

use crate::models::{DailyTotal, PeriodTotal, WalkResult};
use crate::services::walker::PaginationWalker;
use crate::time_utils::days_inclusive;
use chrono::NaiveDate;
use futures_util::future::join_all;

/// Fold one walk into a period total covering exactly `dates`.
///
/// `total_km` is the sum of valid km over `dates`; violation km is reported
/// separately and never counted. No rounding is applied.
pub fn fold(walk: &WalkResult, dates: &[NaiveDate]) -> PeriodTotal {
    let mut total = PeriodTotal::zeroed(walk.participant_id, dates);
    total.daily_breakdown = dates
        .iter()
        .map(|&date| {
            let bucket = walk.daily.get(&date).copied().unwrap_or_default();
            DailyTotal {
                date,
                valid_km: bucket.valid,
                violation_km: bucket.violation,
            }
        })
        .collect();

    total.total_km = total.daily_breakdown.iter().map(|d| d.valid_km).sum();
    total.violation_km = total.daily_breakdown.iter().map(|d| d.violation_km).sum();
    total.original_km = total.total_km;
    total
}

#[derive(Clone)]
pub struct DateRangeFolder {
    walker: PaginationWalker,
}

impl DateRangeFolder {
    pub fn new(walker: PaginationWalker) -> Self {
        Self { walker }
    }

    /// Period totals for every participant in `participant_ids`, in the same order.
    ///
    /// Participants are walked concurrently. A participant whose walk fails
    /// gets an all-zero total, so the output always has one entry per input ID.
    pub async fn fold_participants(
        &self,
        participant_ids: &[u64],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<PeriodTotal> {
        let dates = days_inclusive(start, end);
        let dates = &dates;

        let totals = join_all(participant_ids.iter().map(|&participant_id| async move {
            match self.walker.walk(participant_id, start, end).await {
                Ok(walk) => fold(&walk, dates),
                Err(err) => {
                    tracing::warn!(
                        participant_id,
                        error = %err,
                        "Participant feed unavailable; counting zero"
                    );
                    PeriodTotal::zeroed(participant_id, dates)
                }
            }
        }))
        .await;

        tracing::info!(
            participants = totals.len(),
            start = %start,
            end = %end,
            "Folded period totals"
        );
        totals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityPage, ActivityRecord};
    use crate::services::upstream::{ActivitySource, FetchFailure};
    use async_trait::async_trait;
    use std::sync::Arc;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    /// Participant 2 always fails; everyone else has one 5 km run on the 10th.
    struct FlakySource;

    #[async_trait]
    impl ActivitySource for FlakySource {
        async fn fetch_activity_page(
            &self,
            participant_id: u64,
            page: u32,
        ) -> Result<ActivityPage, FetchFailure> {
            if participant_id == 2 {
                return Err(FetchFailure::Network("connection reset".to_string()));
            }
            if page > 1 {
                return Ok(ActivityPage::default());
            }
            Ok(ActivityPage {
                activities: vec![ActivityRecord {
                    participant_id,
                    date: day(10),
                    distance_km: 5.0,
                    is_violation: false,
                }],
                entry_count: 1,
            })
        }
    }

    #[tokio::test]
    async fn test_failed_participant_is_zeroed_not_dropped() {
        let folder = DateRangeFolder::new(PaginationWalker::new(Arc::new(FlakySource), 50));

        let totals = folder.fold_participants(&[1, 2, 3], day(6), day(12)).await;

        assert_eq!(totals.len(), 3);
        let ids: Vec<u64> = totals.iter().map(|t| t.participant_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(totals[0].total_km, 5.0);
        assert_eq!(totals[1].total_km, 0.0);
        assert_eq!(totals[1].violation_km, 0.0);
        assert_eq!(totals[1].daily_breakdown.len(), 7);
        assert!(totals[1].daily_breakdown.iter().all(|d| d.valid_km == 0.0));
        assert_eq!(totals[2].total_km, 5.0);
    }

    #[tokio::test]
    async fn test_single_day_has_one_breakdown_entry() {
        let folder = DateRangeFolder::new(PaginationWalker::new(Arc::new(FlakySource), 50));

        let totals = folder.fold_participants(&[1], day(10), day(10)).await;

        assert_eq!(totals[0].daily_breakdown.len(), 1);
        assert_eq!(totals[0].daily_breakdown[0].date, day(10));
        assert_eq!(totals[0].start_date, day(10));
        assert_eq!(totals[0].end_date, day(10));
        assert_eq!(totals[0].total_km, 5.0);
        assert_eq!(totals[0].original_km, 5.0);
        assert_eq!(totals[0].adjustment_km, None);
    }

    #[test]
    fn test_fold_keeps_full_precision() {
        let mut walk = WalkResult::new(4, day(1), day(2));
        for km in [0.1, 0.2] {
            walk.record(&ActivityRecord {
                participant_id: 4,
                date: day(1),
                distance_km: km,
                is_violation: false,
            });
        }

        let total = fold(&walk, &days_inclusive(day(1), day(2)));

        assert_eq!(total.total_km, 0.1 + 0.2);
        assert_eq!(total.daily_breakdown[1].valid_km, 0.0);
    }
}
