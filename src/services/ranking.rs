// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Ranking assembly: stable descending sort, dense 1-based ranks, team grouping.

use crate::models::{
    DailyEntry, PeriodTotal, RaceMember, Roster, TeamAggregate, TeamMemberKm, WeeklyEntry,
};
use chrono::NaiveDate;
use std::collections::HashMap;

/// An entry that carries its position in a ranking.
pub trait Ranked {
    fn set_rank(&mut self, rank: u32);
}

impl Ranked for DailyEntry {
    fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }
}

impl Ranked for WeeklyEntry {
    fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }
}

impl Ranked for TeamAggregate {
    fn set_rank(&mut self, rank: u32) {
        self.rank = rank;
    }
}

impl Ranked for RaceMember {
    fn set_rank(&mut self, rank: u32) {
        self.order = rank;
    }
}

/// Sort descending by `key` and overwrite ranks with `index + 1`.
///
/// The sort is stable, so equal keys keep their input order.
pub fn rank_by<T, F>(mut items: Vec<T>, key: F) -> Vec<T>
where
    T: Ranked,
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| key(b).total_cmp(&key(a)));
    for (i, item) in items.iter_mut().enumerate() {
        item.set_rank((i + 1) as u32);
    }
    items
}

/// Group totals into teams using roster membership.
///
/// Participants without a team are left out entirely. Teams are returned in
/// first-seen order with rank 0; rank them with [`rank_by`].
pub fn assemble_teams(
    totals: &[PeriodTotal],
    roster: &Roster,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<TeamAggregate> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut teams: Vec<TeamAggregate> = Vec::new();

    for total in totals {
        let Some(entry) = roster.find(total.participant_id) else {
            continue;
        };
        let Some(team_name) = entry.team() else {
            continue;
        };

        let slot = *index.entry(team_name).or_insert_with(|| {
            teams.push(TeamAggregate {
                rank: 0,
                team_name: team_name.to_string(),
                total_km: 0.0,
                member_count: 0,
                avg_km: 0.0,
                members: Vec::new(),
                start_date: start,
                end_date: end,
            });
            teams.len() - 1
        });

        let team = &mut teams[slot];
        team.total_km += total.total_km;
        team.member_count += 1;
        team.members.push(TeamMemberKm {
            participant_id: total.participant_id,
            member_name: entry.name.clone(),
            km: total.total_km,
        });
    }

    for team in &mut teams {
        team.avg_km = team.total_km / f64::from(team.member_count);
        team.members.sort_by(|a, b| b.km.total_cmp(&a.km));
    }
    teams
}
