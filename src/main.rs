// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Race Leaderboard API Server
//!
//! Computes running-challenge rankings from a race site's activity feeds,
//! with manual km adjustments layered on top.

use anyhow::Context;
use race_leaderboard::{
    config::{AdjustmentBackend, Config},
    db::{AdjustmentStore, FirestoreAdjustmentStore, MemoryAdjustmentStore},
    services::{FileRoster, LeaderboardService, RaceClient},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        race_id = %config.race_id,
        challenge_start = %config.challenge_start,
        "Starting Race Leaderboard API"
    );

    let adjustments: Arc<dyn AdjustmentStore> = match config.adjustment_backend {
        AdjustmentBackend::Memory => {
            tracing::info!("Using in-memory adjustment store; adjustments are lost on restart");
            Arc::new(MemoryAdjustmentStore::new())
        }
        AdjustmentBackend::Firestore => Arc::new(
            FirestoreAdjustmentStore::new(&config.gcp_project_id)
                .await
                .context("Failed to connect to Firestore")?,
        ),
    };

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN not set; adjustment changes are open to anyone");
    }

    let client = Arc::new(RaceClient::new(&config).context("Failed to build upstream client")?);
    tracing::info!(
        base_url = %config.upstream_base_url,
        max_concurrent = config.max_concurrent_upstream,
        "Upstream client initialized"
    );

    tracing::info!(path = %config.roster_path, "Using roster file");
    let roster = Arc::new(FileRoster::new(&config.roster_path));

    let leaderboard =
        LeaderboardService::new(&config, client.clone(), client, roster, adjustments.clone());

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        leaderboard,
        adjustments,
    });

    // Build router
    let app = race_leaderboard::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("race_leaderboard=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
