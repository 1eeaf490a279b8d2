// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod adjustments;
pub mod cache;
pub mod folder;
pub mod leaderboard;
pub mod markup;
pub mod parser;
pub mod ranking;
pub mod roster;
pub mod upstream;
pub mod walker;

pub use adjustments::{Adjustable, AdjustmentMerger};
pub use cache::RankingCache;
pub use folder::DateRangeFolder;
pub use leaderboard::LeaderboardService;
pub use parser::{ActivityPageParser, HtmlActivityParser};
pub use roster::{FileRoster, RosterError, RosterProvider, StaticRoster};
pub use upstream::{ActivitySource, FetchFailure, RaceClient, RaceListing};
pub use walker::{PaginationWalker, WalkError};
