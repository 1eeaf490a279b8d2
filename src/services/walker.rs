// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Pagination walker over a participant's activity feed.
//!
//! The feed is newest first, so pages move backward in time. A walk stops at
//! the first of:
//! 1. an empty page
//! 2. a page whose last dated entry is before the window start
//! 3. a page with entries but no readable dates
//! 4. a fetch failure (pages already read are kept)
//! 5. the page ceiling (logged as a warning)
//!
//! Pages are fetched strictly one after another.

use crate::models::{StopReason, WalkResult};
use crate::services::upstream::{ActivitySource, FetchFailure};
use chrono::NaiveDate;
use std::sync::Arc;

/// The first page could not be read, so nothing was collected.
#[derive(Debug, thiserror::Error)]
#[error("participant {participant_id}: first page failed: {source}")]
pub struct WalkError {
    pub participant_id: u64,
    #[source]
    pub source: FetchFailure,
}

#[derive(Clone)]
pub struct PaginationWalker {
    source: Arc<dyn ActivitySource>,
    max_pages: u32,
}

impl PaginationWalker {
    pub fn new(source: Arc<dyn ActivitySource>, max_pages: u32) -> Self {
        Self {
            source,
            max_pages: max_pages.max(1),
        }
    }

    /// Walk one participant's feed, accumulating activities dated within
    /// `[window_start, window_end]`.
    pub async fn walk(
        &self,
        participant_id: u64,
        window_start: NaiveDate,
        window_end: NaiveDate,
    ) -> Result<WalkResult, WalkError> {
        let mut result = WalkResult::new(participant_id, window_start, window_end);
        let mut page = 1;

        loop {
            if page > self.max_pages {
                tracing::warn!(
                    participant_id,
                    max_pages = self.max_pages,
                    start = %window_start,
                    "Page ceiling reached; totals may be incomplete"
                );
                result.stop = StopReason::PageLimit;
                break;
            }

            let fetched = match self.source.fetch_activity_page(participant_id, page).await {
                Ok(fetched) => fetched,
                Err(source) if page == 1 => {
                    return Err(WalkError {
                        participant_id,
                        source,
                    });
                }
                Err(err) => {
                    tracing::warn!(
                        participant_id,
                        page,
                        error = %err,
                        "Activity page fetch failed; keeping pages already read"
                    );
                    result.stop = StopReason::FetchFailed(err.to_string());
                    break;
                }
            };
            result.pages_fetched = page;

            if fetched.is_empty() {
                result.stop = StopReason::EmptyPage;
                break;
            }

            for activity in &fetched.activities {
                result.record(activity);
            }

            match fetched.last_seen_date() {
                None => {
                    tracing::debug!(participant_id, page, "No dated entries on page");
                    result.stop = StopReason::NoParseableDates;
                    break;
                }
                Some(last_seen) if last_seen < window_start => {
                    result.stop = StopReason::PastWindow;
                    break;
                }
                Some(_) => page += 1,
            }
        }

        tracing::debug!(
            participant_id,
            pages = result.pages_fetched,
            valid_km = result.valid_km,
            violation_km = result.violation_km,
            stop = ?result.stop,
            "Walk finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActivityPage, ActivityRecord};
    use async_trait::async_trait;
    use std::sync::Mutex;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    fn record(date: NaiveDate, km: f64, violation: bool) -> ActivityRecord {
        ActivityRecord {
            participant_id: 1,
            date,
            distance_km: km,
            is_violation: violation,
        }
    }

    fn page(records: Vec<ActivityRecord>) -> ActivityPage {
        ActivityPage {
            entry_count: records.len(),
            activities: records,
        }
    }

    /// Serves scripted pages and records which pages were requested.
    struct ScriptedSource {
        pages: Vec<Result<ActivityPage, FetchFailure>>,
        requested: Mutex<Vec<u32>>,
    }

    impl ScriptedSource {
        fn new(pages: Vec<Result<ActivityPage, FetchFailure>>) -> Arc<Self> {
            Arc::new(Self {
                pages,
                requested: Mutex::new(Vec::new()),
            })
        }

        fn requested(&self) -> Vec<u32> {
            self.requested.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ActivitySource for ScriptedSource {
        async fn fetch_activity_page(
            &self,
            _participant_id: u64,
            page: u32,
        ) -> Result<ActivityPage, FetchFailure> {
            self.requested.lock().unwrap().push(page);
            self.pages
                .get(page as usize - 1)
                .cloned()
                .unwrap_or_else(|| Ok(ActivityPage::default()))
        }
    }

    #[tokio::test]
    async fn test_stops_after_page_past_window() {
        let source = ScriptedSource::new(vec![
            Ok(page(vec![record(day(12), 5.0, false), record(day(11), 3.0, false)])),
            Ok(page(vec![record(day(10), 2.0, false), record(day(8), 1.0, false)])),
            Ok(page(vec![record(day(7), 4.0, false), record(day(4), 9.0, false)])),
            Ok(page(vec![record(day(3), 100.0, false)])),
        ]);
        let walker = PaginationWalker::new(source.clone(), 50);

        let result = walker.walk(1, day(6), day(12)).await.unwrap();

        assert_eq!(source.requested(), vec![1, 2, 3]);
        assert_eq!(result.stop, StopReason::PastWindow);
        assert_eq!(result.pages_fetched, 3);
        assert_eq!(result.valid_km, 5.0 + 3.0 + 2.0 + 1.0 + 4.0);
    }

    #[tokio::test]
    async fn test_window_end_is_inclusive() {
        let source = ScriptedSource::new(vec![Ok(page(vec![
            record(day(13), 50.0, false),
            record(day(12), 7.5, false),
            record(day(5), 1.0, false),
        ]))]);
        let walker = PaginationWalker::new(source, 50);

        let result = walker.walk(1, day(6), day(12)).await.unwrap();

        assert_eq!(result.valid_km, 7.5);
        assert_eq!(result.daily[&day(12)].valid, 7.5);
        assert!(!result.daily.contains_key(&day(13)));
    }

    #[tokio::test]
    async fn test_violations_are_kept_apart() {
        let source = ScriptedSource::new(vec![Ok(page(vec![
            record(day(10), 10.0, true),
            record(day(10), 4.0, false),
        ]))]);
        let walker = PaginationWalker::new(source, 50);

        let result = walker.walk(1, day(10), day(10)).await.unwrap();

        assert_eq!(result.valid_km, 4.0);
        assert_eq!(result.violation_km, 10.0);
        assert_eq!(
            result.daily[&day(10)],
            crate::models::DayBucket {
                valid: 4.0,
                violation: 10.0
            }
        );
    }

    #[tokio::test]
    async fn test_empty_page_stops() {
        let source = ScriptedSource::new(vec![
            Ok(page(vec![record(day(12), 1.0, false)])),
            Ok(ActivityPage::default()),
        ]);
        let walker = PaginationWalker::new(source.clone(), 50);

        let result = walker.walk(1, day(1), day(12)).await.unwrap();

        assert_eq!(source.requested(), vec![1, 2]);
        assert_eq!(result.stop, StopReason::EmptyPage);
        assert_eq!(result.valid_km, 1.0);
    }

    #[tokio::test]
    async fn test_undated_page_stops() {
        let source = ScriptedSource::new(vec![
            Ok(page(vec![record(day(12), 1.0, false)])),
            Ok(ActivityPage {
                activities: vec![],
                entry_count: 3,
            }),
            Ok(page(vec![record(day(11), 1.0, false)])),
        ]);
        let walker = PaginationWalker::new(source.clone(), 50);

        let result = walker.walk(1, day(1), day(12)).await.unwrap();

        assert_eq!(source.requested(), vec![1, 2]);
        assert_eq!(result.stop, StopReason::NoParseableDates);
    }

    #[tokio::test]
    async fn test_later_failure_keeps_partial_totals() {
        let source = ScriptedSource::new(vec![
            Ok(page(vec![record(day(12), 6.0, false)])),
            Err(FetchFailure::Timeout),
            Ok(page(vec![record(day(11), 1.0, false)])),
        ]);
        let walker = PaginationWalker::new(source.clone(), 50);

        let result = walker.walk(1, day(1), day(12)).await.unwrap();

        assert_eq!(source.requested(), vec![1, 2]);
        assert_eq!(result.valid_km, 6.0);
        assert!(matches!(result.stop, StopReason::FetchFailed(_)));
    }

    #[tokio::test]
    async fn test_first_page_failure_is_an_error() {
        let source = ScriptedSource::new(vec![Err(FetchFailure::Status(503))]);
        let walker = PaginationWalker::new(source, 50);

        let err = walker.walk(9, day(1), day(12)).await.unwrap_err();

        assert_eq!(err.participant_id, 9);
        assert_eq!(err.source, FetchFailure::Status(503));
    }

    #[tokio::test]
    async fn test_page_ceiling() {
        let pages = (0..10)
            .map(|_| Ok(page(vec![record(day(12), 1.0, false)])))
            .collect();
        let source = ScriptedSource::new(pages);
        let walker = PaginationWalker::new(source.clone(), 3);

        let result = walker.walk(1, day(1), day(12)).await.unwrap();

        assert_eq!(source.requested(), vec![1, 2, 3]);
        assert_eq!(result.stop, StopReason::PageLimit);
        assert_eq!(result.valid_km, 3.0);
    }
}
