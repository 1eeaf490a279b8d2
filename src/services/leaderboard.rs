// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ranking pipelines.
//!
//! Every view runs the same steps and differs only in how it shapes output:
//! fold participants over the window, apply adjustments once, then rank.
//! Results are cached per view.

use crate::config::Config;
use crate::db::AdjustmentStore;
use crate::error::AppError;
use crate::models::{
    DailyEntry, PeriodTotal, PersonalListingPage, RaceMember, Roster, TeamAggregate,
    TeamListingPage, TeamSortKey, WeeklyEntry,
};
use crate::services::adjustments::AdjustmentMerger;
use crate::services::cache::{participant_scope, CacheKey, RankingCache};
use crate::services::folder::DateRangeFolder;
use crate::services::ranking::{assemble_teams, rank_by};
use crate::services::roster::RosterProvider;
use crate::services::upstream::{ActivitySource, RaceListing};
use crate::services::walker::PaginationWalker;
use crate::time_utils::today_at_offset;
use chrono::NaiveDate;
use futures_util::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;

/// Collapse duplicate participant IDs, keeping first occurrences.
///
/// Rejects an empty list and the reserved ID 0.
pub fn normalize_participants(participant_ids: &[u64]) -> Result<Vec<u64>, AppError> {
    if participant_ids.is_empty() {
        return Err(AppError::BadRequest(
            "memberIds must list at least one participant".to_string(),
        ));
    }
    if participant_ids.contains(&0) {
        return Err(AppError::BadRequest(
            "memberIds must be positive".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    Ok(participant_ids
        .iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect())
}

pub struct LeaderboardService {
    folder: DateRangeFolder,
    merger: AdjustmentMerger,
    listing: Arc<dyn RaceListing>,
    roster: Arc<dyn RosterProvider>,
    cache: RankingCache,
    team_listing_pages: u32,
    challenge_start: NaiveDate,
    challenge_end: Option<NaiveDate>,
    utc_offset_hours: i32,
    max_range_days: i64,
}

impl LeaderboardService {
    pub fn new(
        config: &Config,
        source: Arc<dyn ActivitySource>,
        listing: Arc<dyn RaceListing>,
        roster: Arc<dyn RosterProvider>,
        store: Arc<dyn AdjustmentStore>,
    ) -> Self {
        let walker = PaginationWalker::new(source, config.max_pages_per_participant);
        Self {
            folder: DateRangeFolder::new(walker),
            merger: AdjustmentMerger::new(store),
            listing,
            roster,
            cache: RankingCache::new(config.daily_cache_ttl, config.weekly_cache_ttl),
            team_listing_pages: config.team_listing_pages.max(1),
            challenge_start: config.challenge_start,
            challenge_end: config.challenge_end,
            utc_offset_hours: config.upstream_utc_offset_hours,
            max_range_days: config.max_range_days,
        }
    }

    /// Today's date in the upstream time zone.
    pub fn today(&self) -> NaiveDate {
        today_at_offset(self.utc_offset_hours)
    }

    /// `challenge_start ..= min(challenge_end, today)`.
    pub fn challenge_window(&self) -> (NaiveDate, NaiveDate) {
        let today = self.today();
        let end = self.challenge_end.map_or(today, |end| end.min(today));
        (self.challenge_start, end.max(self.challenge_start))
    }

    /// Reject inverted or overly long windows.
    pub fn check_range(&self, start: NaiveDate, end: NaiveDate) -> Result<(), AppError> {
        if start > end {
            return Err(AppError::BadRequest(
                "startDate must not be after endDate".to_string(),
            ));
        }
        let days = (end - start).num_days() + 1;
        if days > self.max_range_days {
            return Err(AppError::BadRequest(format!(
                "date range spans {} days; at most {} allowed",
                days, self.max_range_days
            )));
        }
        Ok(())
    }

    /// Forget cached views that include adjustments.
    pub fn invalidate(&self) {
        self.cache.invalidate_adjusted();
    }

    async fn load_roster(&self) -> Result<Roster, AppError> {
        self.roster.load().await.map_err(|e| {
            tracing::error!(error = %e, "Roster unavailable");
            AppError::Roster(e.to_string())
        })
    }

    /// Fold, then adjust once.
    async fn adjusted_totals(
        &self,
        participant_ids: &[u64],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<PeriodTotal> {
        let mut totals = self
            .folder
            .fold_participants(participant_ids, start, end)
            .await;
        self.merger.apply(&mut totals, start, end).await;
        totals
    }

    /// Single-day ranking for the given participants.
    pub async fn daily(
        &self,
        participant_ids: &[u64],
        date: NaiveDate,
    ) -> Result<Vec<DailyEntry>, AppError> {
        let ids = normalize_participants(participant_ids)?;
        let key = CacheKey::Daily {
            date,
            scope: participant_scope(&ids),
        };
        if let Some(hit) = self.cache.daily.get(&key) {
            tracing::debug!(date = %date, "Daily ranking cache hit");
            return Ok(hit);
        }

        let entries: Vec<DailyEntry> = self
            .adjusted_totals(&ids, date, date)
            .await
            .into_iter()
            .map(DailyEntry::from)
            .collect();
        let ranked = rank_by(entries, |e: &DailyEntry| e.km);

        self.cache.daily.set(key, ranked.clone());
        Ok(ranked)
    }

    /// Personal ranking over `[start, end]` for the given participants.
    pub async fn weekly(
        &self,
        participant_ids: &[u64],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<WeeklyEntry>, AppError> {
        self.check_range(start, end)?;
        let ids = normalize_participants(participant_ids)?;
        let key = CacheKey::Weekly {
            start,
            end,
            scope: participant_scope(&ids),
        };
        if let Some(hit) = self.cache.weekly.get(&key) {
            tracing::debug!(start = %start, end = %end, "Weekly ranking cache hit");
            return Ok(hit);
        }

        let entries: Vec<WeeklyEntry> = self
            .adjusted_totals(&ids, start, end)
            .await
            .into_iter()
            .map(WeeklyEntry::from)
            .collect();
        let ranked = rank_by(entries, |e: &WeeklyEntry| e.total.total_km);

        self.cache.weekly.set(key, ranked.clone());
        Ok(ranked)
    }

    /// Team ranking over `[start, end]` for every roster participant with a team.
    pub async fn weekly_team(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        sort: TeamSortKey,
    ) -> Result<Vec<TeamAggregate>, AppError> {
        self.check_range(start, end)?;
        let key = CacheKey::WeeklyTeam { start, end, sort };
        if let Some(hit) = self.cache.weekly_team.get(&key) {
            return Ok(hit);
        }

        let roster = self.load_roster().await?;
        let ids: Vec<u64> = roster
            .participant_ids()
            .into_iter()
            .filter(|id| roster.find(*id).and_then(|e| e.team()).is_some())
            .collect();

        let totals = self.adjusted_totals(&ids, start, end).await;
        let teams = assemble_teams(&totals, &roster, start, end);
        let ranked = rank_by(teams, |t: &TeamAggregate| sort.value(t));

        tracing::info!(
            teams = ranked.len(),
            participants = ids.len(),
            start = %start,
            end = %end,
            "Computed team ranking"
        );
        self.cache.weekly_team.set(key, ranked.clone());
        Ok(ranked)
    }

    /// One participant's daily breakdown over `[start, end]`.
    pub async fn member(
        &self,
        participant_id: u64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PeriodTotal, AppError> {
        self.check_range(start, end)?;
        let ids = normalize_participants(&[participant_id])?;
        let key = CacheKey::Member {
            participant_id,
            start,
            end,
        };
        if let Some(hit) = self.cache.member.get(&key) {
            return Ok(hit);
        }

        let total = self
            .adjusted_totals(&ids, start, end)
            .await
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("fold returned no total for {}", participant_id))?;

        self.cache.member.set(key, total.clone());
        Ok(total)
    }

    /// Upstream personal listing with banned roster participants merged in on
    /// the first page, adjusted over the challenge window, then re-ranked.
    pub async fn personal(&self, page: u32) -> Result<PersonalListingPage, AppError> {
        if page == 0 {
            return Err(AppError::BadRequest("page numbers start at 1".to_string()));
        }
        let key = CacheKey::Personal { page };
        if let Some(hit) = self.cache.personal.get(&key) {
            return Ok(hit);
        }

        let mut listing = self.listing.personal_page(page).await.map_err(|e| {
            AppError::Upstream(format!("personal ranking page {}: {}", page, e))
        })?;
        let (start, end) = self.challenge_window();

        // Ranks on later pages continue after the ones before them
        let rank_offset = listing
            .data
            .members
            .iter()
            .map(|m| m.order)
            .filter(|&order| order > 0)
            .min()
            .map_or(0, |order| order - 1);

        let mut members = std::mem::take(&mut listing.data.members);
        if page == 1 {
            let banned = self.banned_members(&members, start, end).await?;
            members.extend(banned);
        }

        self.merger.apply(&mut members, start, end).await;
        let mut ranked = rank_by(members, |m: &RaceMember| m.final_value);
        for member in &mut ranked {
            member.order += rank_offset;
        }
        listing.data.members = ranked;

        self.cache.personal.set(key, listing.clone());
        Ok(listing)
    }

    /// Roster-banned participants missing from `listed`, with walked totals.
    async fn banned_members(
        &self,
        listed: &[RaceMember],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<RaceMember>, AppError> {
        let roster = self.load_roster().await?;
        let present: HashSet<u64> = listed.iter().map(RaceMember::participant_id).collect();

        let mut seen = HashSet::new();
        let banned: Vec<_> = roster
            .banned()
            .filter(|(id, _)| !present.contains(id) && seen.insert(*id))
            .collect();
        if banned.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<u64> = banned.iter().map(|(id, _)| *id).collect();
        let totals = self.folder.fold_participants(&ids, start, end).await;

        tracing::info!(count = ids.len(), "Merged banned participants into listing");
        Ok(banned
            .iter()
            .zip(totals)
            .map(|((id, entry), total)| RaceMember::from_roster(entry, *id, total.total_km))
            .collect())
    }

    /// Upstream team listing, pages fetched concurrently and concatenated.
    ///
    /// The first page is required; later pages are skipped if they fail.
    pub async fn teams(&self) -> Result<TeamListingPage, AppError> {
        let key = CacheKey::TeamListing;
        if let Some(hit) = self.cache.team_listing.get(&key) {
            return Ok(hit);
        }

        let pages = join_all((1..=self.team_listing_pages).map(|page| self.listing.team_page(page)))
            .await;

        let mut pages = pages.into_iter().enumerate();
        let mut merged = match pages.next() {
            Some((_, Ok(first))) => first,
            Some((_, Err(e))) => {
                return Err(AppError::Upstream(format!("team ranking page 1: {}", e)));
            }
            None => TeamListingPage::default(),
        };
        for (i, page) in pages {
            match page {
                Ok(page) => merged.data.teams.extend(page.data.teams),
                Err(e) => {
                    tracing::warn!(
                        page = i + 1,
                        error = %e,
                        "Team ranking page unavailable; skipping"
                    );
                }
            }
        }

        if merged.data.count_total_distance.is_null() {
            merged.data.count_total_distance = serde_json::Value::from(0);
        }

        self.cache.team_listing.set(key, merged.clone());
        Ok(merged)
    }
}
