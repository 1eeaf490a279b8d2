// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process adjustment store. Contents are lost on restart.

use crate::db::AdjustmentStore;
use crate::error::AppError;
use crate::models::{Adjustment, AdjustmentFilter, NewAdjustment};
use async_trait::async_trait;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryAdjustmentStore {
    adjustments: RwLock<Vec<Adjustment>>,
}

impl MemoryAdjustmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing records.
    pub fn with_adjustments(adjustments: Vec<Adjustment>) -> Self {
        Self {
            adjustments: RwLock::new(adjustments),
        }
    }
}

#[async_trait]
impl AdjustmentStore for MemoryAdjustmentStore {
    async fn list(&self, filter: &AdjustmentFilter) -> Result<Vec<Adjustment>, AppError> {
        let adjustments = self.adjustments.read().await;
        Ok(adjustments
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect())
    }

    async fn create(&self, new: NewAdjustment) -> Result<Adjustment, AppError> {
        let mut adjustment = Adjustment::from_new(new, chrono::Utc::now());
        let mut adjustments = self.adjustments.write().await;

        // IDs have millisecond resolution; keep them unique for back-to-back writes.
        let base_id = adjustment.id.clone();
        let mut suffix = 1;
        while adjustments.iter().any(|a| a.id == adjustment.id) {
            adjustment.id = format!("{}-{}", base_id, suffix);
            suffix += 1;
        }

        adjustments.push(adjustment.clone());
        Ok(adjustment)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let mut adjustments = self.adjustments.write().await;
        let before = adjustments.len();
        adjustments.retain(|a| a.id != id);
        Ok(adjustments.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn new_adjustment(bib: u64, date: &str, km: f64) -> NewAdjustment {
        NewAdjustment {
            bib_number: bib,
            date: date.parse().unwrap(),
            adjustment_km: km,
            reason: String::new(),
        }
    }

    #[tokio::test]
    async fn test_create_list_delete() {
        let store = MemoryAdjustmentStore::new();
        let first = store
            .create(new_adjustment(7, "2025-10-05", 5.0))
            .await
            .unwrap();
        store
            .create(new_adjustment(7, "2025-10-06", -2.0))
            .await
            .unwrap();

        let all = store.list(&AdjustmentFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let on_day = store
            .list(&AdjustmentFilter {
                date: NaiveDate::from_ymd_opt(2025, 10, 5),
                ..AdjustmentFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(on_day, vec![first.clone()]);

        assert!(store.delete(&first.id).await.unwrap());
        assert!(!store.delete(&first.id).await.unwrap());
        assert_eq!(
            store.list(&AdjustmentFilter::default()).await.unwrap().len(),
            1
        );
    }

    #[tokio::test]
    async fn test_same_participant_and_day_are_kept_separately() {
        let store = MemoryAdjustmentStore::new();
        store
            .create(new_adjustment(7, "2025-10-05", 5.0))
            .await
            .unwrap();
        store
            .create(new_adjustment(7, "2025-10-05", -2.0))
            .await
            .unwrap();

        let listed = store
            .list(&AdjustmentFilter {
                bib_number: Some(7),
                ..AdjustmentFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
    }
}
