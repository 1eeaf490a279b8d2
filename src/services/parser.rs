// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity feed page parser.
//!
//! Each activity in the feed is a `.post` element carrying:
//! - a `<time>` with `DD/MM/YYYY HH:MM:SS (GMT+7)`
//! - a distance text such as `12.34 km` in the first `.ibl` of the first `.cell`
//! - an `h4.name.ellipsis` title, marked `text-danger` when upstream flagged it

use crate::models::{ParsedEntry, ParsedPage};
use crate::services::markup::{inner_markup, start_tags, text_content, StartTag};
use crate::time_utils::parse_upstream_day;
use regex::Regex;
use std::sync::LazyLock;

/// Extracts activity entries from raw feed markup.
pub trait ActivityPageParser: Send + Sync {
    fn parse(&self, markup: &str) -> ParsedPage;
}

/// Parser for the race site's activity feed markup.
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlActivityParser;

impl ActivityPageParser for HtmlActivityParser {
    fn parse(&self, markup: &str) -> ParsedPage {
        let post_starts: Vec<usize> = start_tags(markup)
            .filter(|t| t.has_class("post"))
            .map(|t| t.start)
            .collect();

        let mut page = ParsedPage {
            entries: Vec::with_capacity(post_starts.len()),
            entry_count: post_starts.len(),
        };

        for (i, &start) in post_starts.iter().enumerate() {
            let end = post_starts.get(i + 1).copied().unwrap_or(markup.len());
            match parse_entry(&markup[start..end]) {
                Some(entry) => page.entries.push(entry),
                None => {
                    tracing::debug!(offset = start, "Skipping activity entry without a date")
                }
            }
        }

        page
    }
}

/// Parse a single `.post` block. `None` if the entry has no readable date.
fn parse_entry(block: &str) -> Option<ParsedEntry> {
    let tags: Vec<StartTag> = start_tags(block).collect();

    let time_tag = tags.iter().find(|t| t.is("time"))?;
    let date = parse_upstream_day(&text_content(inner_markup(block, time_tag)))?;

    let distance_km = tags
        .iter()
        .position(|t| t.has_class("cell"))
        .and_then(|cell| tags[cell + 1..].iter().find(|t| t.has_class("ibl")))
        .and_then(|ibl| extract_km(&text_content(inner_markup(block, ibl))))
        .unwrap_or(0.0);

    let is_violation = tags
        .iter()
        .find(|t| t.is("h4") && t.has_class("name") && t.has_class("ellipsis"))
        .is_some_and(|t| t.has_class("text-danger"));

    Some(ParsedEntry {
        date,
        distance_km,
        is_violation,
    })
}

/// Number immediately followed by a `km` unit, whitespace allowed between.
static KM_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"([\d.]+)\s*km").ok());

/// Find the first number followed by a `km` unit, e.g. `"Run 12.34 km"` -> 12.34.
///
/// A dotted run with several dots keeps its longest leading decimal
/// (`"1.2.3km"` -> 1.2).
pub fn extract_km(text: &str) -> Option<f64> {
    KM_RE
        .as_ref()?
        .captures_iter(text)
        .find_map(|caps| leading_decimal(caps.get(1)?.as_str()))
}

/// Longest `digits[.digits]` prefix of a run of digits and dots.
fn leading_decimal(run: &str) -> Option<f64> {
    let mut seen_dot = false;
    let mut end = 0;
    for (i, b) in run.bytes().enumerate() {
        match b {
            b'0'..=b'9' => end = i + 1,
            b'.' if !seen_dot => {
                seen_dot = true;
                end = i + 1;
            }
            _ => break,
        }
    }
    let candidate = run[..end].trim_end_matches('.');
    if !candidate.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    candidate.parse().ok()
}
