// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Base ranking listings served by the upstream JSON API.
//!
//! These are passed through to the dashboard, so unknown fields are kept
//! verbatim in the flattened `extra`/`meta` maps and field names follow
//! the upstream (snake_case) spelling.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::models::RosterEntry;

/// One row of the upstream personal ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceMember {
    #[serde(deserialize_with = "de_id")]
    pub id: u64,
    #[serde(default, deserialize_with = "de_opt_id")]
    pub bib_number: Option<u64>,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub team_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    /// Total km; upstream sends it as a numeric string
    #[serde(default, deserialize_with = "de_km")]
    pub final_value: f64,
    /// 1-based position, rewritten after re-ranking
    #[serde(default, deserialize_with = "de_rank")]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adjustment_km: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RaceMember {
    /// ID that adjustments and activity feeds are keyed by.
    pub fn participant_id(&self) -> u64 {
        self.bib_number.unwrap_or(self.id)
    }

    /// Build a listing row for a roster participant missing from the upstream listing.
    pub fn from_roster(entry: &RosterEntry, participant_id: u64, total_km: f64) -> Self {
        let mut extra = Map::new();
        extra.insert("ban".to_string(), Value::Bool(entry.ban));
        Self {
            id: participant_id,
            bib_number: Some(participant_id),
            full_name: entry.name.clone(),
            team_name: entry.team().map(str::to_string),
            avatar: None,
            final_value: total_km,
            order: 0,
            adjustment_km: None,
            extra,
        }
    }
}

/// Upstream personal ranking page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalListingPage {
    #[serde(default)]
    pub data: PersonalListingData,
    #[serde(flatten)]
    pub meta: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonalListingData {
    #[serde(default)]
    pub members: Vec<RaceMember>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Upstream team ranking page; also the shape of the merged team response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamListingPage {
    #[serde(default)]
    pub data: TeamListingData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TeamListingData {
    #[serde(default)]
    pub teams: Vec<Value>,
    #[serde(default, rename = "countTotalDistance")]
    pub count_total_distance: Value,
}

/// Read a number out of a JSON number or a numeric string like `"1,234.5 km"`.
fn json_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s
                .chars()
                .filter(|c| c.is_ascii_digit() || *c == '.')
                .collect();
            cleaned.parse().ok()
        }
        _ => None,
    }
}

fn de_km<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(json_number(&value).unwrap_or(0.0))
}

fn de_rank<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(json_number(&value).map(|n| n as u32).unwrap_or(0))
}

fn de_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    parse_id(&value).ok_or_else(|| D::Error::custom(format!("invalid member id: {}", value)))
}

fn de_opt_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(parse_id(&value))
}

fn parse_id(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
