// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Participant roster (names, team membership, ban flag).

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Team name the upstream export uses for "no team".
const NULL_TEAM: &str = "null";

/// One participant as listed in the roster file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterEntry {
    pub name: String,
    /// Upstream member ID, stored as a string in the export
    pub member_id: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub strava_id: Option<String>,
    /// Hidden from the upstream listing but still ranked here
    #[serde(default)]
    pub ban: bool,
}

impl RosterEntry {
    /// Numeric participant ID, if the member ID is a positive integer.
    pub fn participant_id(&self) -> Option<u64> {
        self.member_id.trim().parse::<u64>().ok().filter(|id| *id > 0)
    }

    /// Team name, or `None` when missing, blank or the `"null"` placeholder.
    pub fn team(&self) -> Option<&str> {
        self.team_name
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != NULL_TEAM)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Roster {
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    pub fn new(entries: Vec<RosterEntry>) -> Self {
        Self { entries }
    }

    /// Every distinct participant ID in roster order.
    pub fn participant_ids(&self) -> Vec<u64> {
        let mut seen = HashSet::new();
        self.entries
            .iter()
            .filter_map(RosterEntry::participant_id)
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// Participants flagged `ban`.
    pub fn banned(&self) -> impl Iterator<Item = (u64, &RosterEntry)> {
        self.entries
            .iter()
            .filter(|e| e.ban)
            .filter_map(|e| e.participant_id().map(|id| (id, e)))
    }

    pub fn find(&self, participant_id: u64) -> Option<&RosterEntry> {
        self.entries
            .iter()
            .find(|e| e.participant_id() == Some(participant_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(member_id: &str, team: Option<&str>, ban: bool) -> RosterEntry {
        RosterEntry {
            name: format!("Runner {}", member_id),
            member_id: member_id.to_string(),
            team_name: team.map(str::to_string),
            gender: "F".to_string(),
            strava_id: None,
            ban,
        }
    }

    #[test]
    fn test_team_placeholders_are_no_team() {
        assert_eq!(entry("1", Some("Falcons"), false).team(), Some("Falcons"));
        assert_eq!(entry("1", Some("null"), false).team(), None);
        assert_eq!(entry("1", Some("  "), false).team(), None);
        assert_eq!(entry("1", None, false).team(), None);
    }

    #[test]
    fn test_participant_ids_skip_invalid_and_duplicates() {
        let roster = Roster::new(vec![
            entry("3", None, false),
            entry("abc", None, false),
            entry("0", None, false),
            entry("1", None, true),
            entry("3", None, false),
        ]);
        assert_eq!(roster.participant_ids(), vec![3, 1]);
        let banned: Vec<u64> = roster.banned().map(|(id, _)| id).collect();
        assert_eq!(banned, vec![1]);
    }

    #[test]
    fn test_deserialize_export_row() {
        let row: RosterEntry = serde_json::from_str(
            r#"{"name":"Tran B","member_id":"2044","team_name":"null","gender":"M"}"#,
        )
        .unwrap();
        assert_eq!(row.participant_id(), Some(2044));
        assert_eq!(row.team(), None);
        assert!(!row.ban);
    }
}
