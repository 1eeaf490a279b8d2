// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory result cache for computed rankings.
//!
//! Entries are derived and can always be recomputed. Failures are never
//! cached; callers only `set` successful results.

use crate::models::{
    DailyEntry, PeriodTotal, PersonalListingPage, TeamAggregate, TeamListingPage, TeamSortKey,
    WeeklyEntry,
};
use chrono::NaiveDate;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Identifies one ranking computation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Daily {
        date: NaiveDate,
        scope: u64,
    },
    Weekly {
        start: NaiveDate,
        end: NaiveDate,
        scope: u64,
    },
    WeeklyTeam {
        start: NaiveDate,
        end: NaiveDate,
        sort: TeamSortKey,
    },
    Personal {
        page: u32,
    },
    TeamListing,
    Member {
        participant_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    },
}

/// Fingerprint of the requested participant list.
pub fn participant_scope(participant_ids: &[u64]) -> u64 {
    let mut hasher = DefaultHasher::new();
    participant_ids.hash(&mut hasher);
    hasher.finish()
}

struct Entry<V> {
    value: V,
    stored_at: Instant,
}

/// Concurrent map whose entries expire `ttl` after being stored.
///
/// A zero TTL disables caching. Writers race with last-writer-wins.
pub struct TtlCache<K, V> {
    entries: DashMap<K, Entry<V>>,
    ttl: Duration,
}

impl<K: Eq + Hash, V: Clone> TtlCache<K, V> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn get(&self, key: &K) -> Option<V> {
        {
            let entry = self.entries.get(key)?;
            if entry.stored_at.elapsed() < self.ttl {
                return Some(entry.value.clone());
            }
        }
        // Read guard must be released before removing. A concurrent `set`
        // may have refreshed the entry in between.
        self.entries.remove_if(key, |_, entry| entry.stored_at.elapsed() >= self.ttl);
        None
    }

    /// Store `value`. Every write first sweeps out expired entries.
    pub fn set(&self, key: K, value: V) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.retain(|_, entry| entry.stored_at.elapsed() < self.ttl);
        self.entries.insert(
            key,
            Entry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// One cache per ranking view, shared across requests.
#[derive(Clone)]
pub struct RankingCache {
    pub daily: Arc<TtlCache<CacheKey, Vec<DailyEntry>>>,
    pub weekly: Arc<TtlCache<CacheKey, Vec<WeeklyEntry>>>,
    pub weekly_team: Arc<TtlCache<CacheKey, Vec<TeamAggregate>>>,
    pub personal: Arc<TtlCache<CacheKey, PersonalListingPage>>,
    pub team_listing: Arc<TtlCache<CacheKey, TeamListingPage>>,
    pub member: Arc<TtlCache<CacheKey, PeriodTotal>>,
}

impl RankingCache {
    /// `short_ttl` covers the daily and personal views, `long_ttl` the rest.
    pub fn new(short_ttl: Duration, long_ttl: Duration) -> Self {
        Self {
            daily: Arc::new(TtlCache::new(short_ttl)),
            weekly: Arc::new(TtlCache::new(long_ttl)),
            weekly_team: Arc::new(TtlCache::new(long_ttl)),
            personal: Arc::new(TtlCache::new(short_ttl)),
            team_listing: Arc::new(TtlCache::new(long_ttl)),
            member: Arc::new(TtlCache::new(long_ttl)),
        }
    }

    /// Drop every view that can include adjustments.
    pub fn invalidate_adjusted(&self) {
        self.daily.clear();
        self.weekly.clear();
        self.weekly_team.clear();
        self.personal.clear();
        self.member.clear();
        tracing::debug!("Cleared adjusted ranking caches");
    }
}
