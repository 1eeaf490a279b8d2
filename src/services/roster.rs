// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Roster loading.

use crate::models::{Roster, RosterEntry};
use async_trait::async_trait;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("cannot read roster {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed roster {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Supplies the current participant roster.
#[async_trait]
pub trait RosterProvider: Send + Sync {
    async fn load(&self) -> Result<Roster, RosterError>;
}

/// Roster read from a JSON array of entries on each load, so edits to the
/// file take effect without a restart.
#[derive(Debug, Clone)]
pub struct FileRoster {
    path: PathBuf,
}

impl FileRoster {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl RosterProvider for FileRoster {
    async fn load(&self) -> Result<Roster, RosterError> {
        let path = self.path.display().to_string();
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| RosterError::Io {
                path: path.clone(),
                source,
            })?;
        let entries: Vec<RosterEntry> =
            serde_json::from_str(&raw).map_err(|source| RosterError::Parse { path, source })?;

        tracing::debug!(entries = entries.len(), "Loaded roster");
        Ok(Roster::new(entries))
    }
}

/// Fixed in-memory roster.
#[derive(Debug, Clone, Default)]
pub struct StaticRoster {
    roster: Roster,
}

impl StaticRoster {
    pub fn new(roster: Roster) -> Self {
        Self { roster }
    }
}

#[async_trait]
impl RosterProvider for StaticRoster {
    async fn load(&self) -> Result<Roster, RosterError> {
        Ok(self.roster.clone())
    }
}
