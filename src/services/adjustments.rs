// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Merges manual km adjustments into computed totals.
//!
//! Applying is not idempotent: each call adds the adjustment sums again.
//! Every ranking pipeline applies exactly once, right before ranking.

use crate::db::AdjustmentStore;
use crate::error::AppError;
use crate::models::{AdjustmentFilter, PeriodTotal, RaceMember};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::Arc;

/// Something whose counted distance an adjustment can correct.
pub trait Adjustable {
    fn participant_id(&self) -> u64;
    fn counted_km(&self) -> f64;
    /// Record the adjustment sum and the new, already floored, total.
    fn record_adjustment(&mut self, adjustment_km: f64, total_km: f64);
}

impl Adjustable for PeriodTotal {
    fn participant_id(&self) -> u64 {
        self.participant_id
    }

    fn counted_km(&self) -> f64 {
        self.total_km
    }

    fn record_adjustment(&mut self, adjustment_km: f64, total_km: f64) {
        self.adjustment_km = Some(adjustment_km);
        self.total_km = total_km;
    }
}

impl Adjustable for RaceMember {
    fn participant_id(&self) -> u64 {
        RaceMember::participant_id(self)
    }

    fn counted_km(&self) -> f64 {
        self.final_value
    }

    fn record_adjustment(&mut self, adjustment_km: f64, total_km: f64) {
        self.adjustment_km = Some(adjustment_km);
        self.final_value = total_km;
    }
}

/// Apply per-participant adjustment sums. Zero sums leave the item untouched.
pub fn apply_sums<T: Adjustable>(items: &mut [T], sums: &HashMap<u64, f64>) -> usize {
    let mut applied = 0;
    for item in items.iter_mut() {
        let Some(&sum) = sums.get(&item.participant_id()) else {
            continue;
        };
        if sum == 0.0 {
            continue;
        }
        let total = (item.counted_km() + sum).max(0.0);
        item.record_adjustment(sum, total);
        applied += 1;
    }
    applied
}

#[derive(Clone)]
pub struct AdjustmentMerger {
    store: Arc<dyn AdjustmentStore>,
}

impl AdjustmentMerger {
    pub fn new(store: Arc<dyn AdjustmentStore>) -> Self {
        Self { store }
    }

    /// Adjustment sums per bib number for adjustments dated in `[start, end]`.
    pub async fn load_sums(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<HashMap<u64, f64>, AppError> {
        let adjustments = self.store.list(&AdjustmentFilter::for_range(start, end)).await?;

        let mut sums: HashMap<u64, f64> = HashMap::new();
        for adjustment in &adjustments {
            *sums.entry(adjustment.bib_number).or_default() += adjustment.adjustment_km;
        }
        Ok(sums)
    }

    /// Apply adjustments dated in `[start, end]` to `items`.
    ///
    /// If the store cannot be read, items are left unadjusted and the failure
    /// is only logged.
    pub async fn apply<T: Adjustable>(&self, items: &mut [T], start: NaiveDate, end: NaiveDate) {
        match self.load_sums(start, end).await {
            Ok(sums) => {
                let applied = apply_sums(items, &sums);
                tracing::debug!(
                    start = %start,
                    end = %end,
                    participants = sums.len(),
                    applied,
                    "Applied km adjustments"
                );
            }
            Err(e) => {
                tracing::warn!(
                    start = %start,
                    end = %end,
                    error = %e,
                    "Adjustment store unavailable; totals left unadjusted"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FirestoreAdjustmentStore, MemoryAdjustmentStore};
    use crate::models::{Adjustment, NewAdjustment};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn total(participant_id: u64, km: f64) -> PeriodTotal {
        let mut total = PeriodTotal::zeroed(participant_id, &[day(6)]);
        total.total_km = km;
        total.original_km = km;
        total
    }

    fn adjustment(bib_number: u64, date: NaiveDate, km: f64, millis: i64) -> Adjustment {
        Adjustment::from_new(
            NewAdjustment {
                bib_number,
                date,
                adjustment_km: km,
                reason: "manual".to_string(),
            },
            chrono::DateTime::from_timestamp_millis(millis).unwrap(),
        )
    }

    fn merger(adjustments: Vec<Adjustment>) -> AdjustmentMerger {
        AdjustmentMerger::new(Arc::new(MemoryAdjustmentStore::with_adjustments(adjustments)))
    }

    #[tokio::test]
    async fn test_total_is_floored_at_zero() {
        let merger = merger(vec![adjustment(1, day(6), -30.0, 1)]);
        let mut totals = vec![total(1, 10.0)];

        merger.apply(&mut totals, day(6), day(12)).await;

        assert_eq!(totals[0].total_km, 0.0);
        assert_eq!(totals[0].adjustment_km, Some(-30.0));
        assert_eq!(totals[0].original_km, 10.0);
    }

    #[tokio::test]
    async fn test_adjustments_for_one_participant_are_summed() {
        let merger = merger(vec![
            adjustment(1, day(6), 5.0, 1),
            adjustment(1, day(8), -2.0, 2),
            adjustment(2, day(20), 50.0, 3),
        ]);
        let mut totals = vec![total(1, 10.0), total(2, 4.0)];

        merger.apply(&mut totals, day(6), day(12)).await;

        assert_eq!(totals[0].adjustment_km, Some(3.0));
        assert_eq!(totals[0].total_km, 13.0);
        // Out-of-range adjustment ignored
        assert_eq!(totals[1].adjustment_km, None);
        assert_eq!(totals[1].total_km, 4.0);
    }

    #[tokio::test]
    async fn test_second_application_adds_again() {
        let merger = merger(vec![adjustment(1, day(6), 3.0, 1)]);
        let mut totals = vec![total(1, 1.0)];

        merger.apply(&mut totals, day(6), day(6)).await;
        assert_eq!(totals[0].total_km, 4.0);

        merger.apply(&mut totals, day(6), day(6)).await;
        assert_eq!(totals[0].total_km, 7.0);
    }

    #[tokio::test]
    async fn test_store_failure_passes_totals_through() {
        let merger = AdjustmentMerger::new(Arc::new(FirestoreAdjustmentStore::new_mock()));
        let mut totals = vec![total(1, 10.0)];

        merger.apply(&mut totals, day(6), day(12)).await;

        assert_eq!(totals, vec![total(1, 10.0)]);
    }

    #[test]
    fn test_zero_sum_leaves_adjustment_absent() {
        let sums = HashMap::from([(1, 0.0)]);
        let mut totals = vec![total(1, 10.0)];

        assert_eq!(apply_sums(&mut totals, &sums), 0);
        assert_eq!(totals[0].adjustment_km, None);
    }

    #[test]
    fn test_members_are_adjusted_by_bib() {
        let mut member: RaceMember = serde_json::from_value(serde_json::json!({
            "id": 77,
            "bib_number": 5,
            "final_value": 20.0,
        }))
        .unwrap();
        let sums = HashMap::from([(5, -4.5)]);

        apply_sums(std::slice::from_mut(&mut member), &sums);

        assert_eq!(member.final_value, 15.5);
        assert_eq!(member.adjustment_km, Some(-4.5));
    }
}
