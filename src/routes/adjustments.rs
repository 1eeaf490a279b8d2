// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Manual km adjustment routes.
//!
//! Listing is public. Creating and deleting go through the admin guard.

use crate::error::{AppError, Result};
use crate::middleware::require_admin;
use crate::models::{Adjustment, AdjustmentFilter, NewAdjustment};
use crate::routes::{json_body, query_params};
use crate::AppState;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    extract::{Query, State},
    middleware,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

pub fn routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let admin_only = post(create_adjustment)
        .delete(delete_adjustment)
        .route_layer(middleware::from_fn_with_state(state, require_admin));

    Router::new().route(
        "/api/km-adjustments",
        get(list_adjustments).merge(admin_only),
    )
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub date: Option<NaiveDate>,
    pub bib_number: Option<u64>,
}

async fn list_adjustments(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Adjustment>>> {
    let query = query_params(query)?;
    let filter = AdjustmentFilter {
        date: query.date,
        range: None,
        bib_number: query.bib_number,
    };
    Ok(Json(state.adjustments.list(&filter).await?))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdjustmentRequest {
    #[validate(range(min = 1, message = "bibNumber must be positive"))]
    pub bib_number: u64,
    pub date: NaiveDate,
    pub adjustment_km: f64,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub reason: String,
}

async fn create_adjustment(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<CreateAdjustmentRequest>, JsonRejection>,
) -> Result<Json<Adjustment>> {
    let body = json_body(payload)?;
    body.validate()?;

    let adjustment = state
        .adjustments
        .create(NewAdjustment {
            bib_number: body.bib_number,
            date: body.date,
            adjustment_km: body.adjustment_km,
            reason: body.reason,
        })
        .await?;
    state.leaderboard.invalidate();

    tracing::info!(
        id = %adjustment.id,
        bib_number = adjustment.bib_number,
        adjustment_km = adjustment.adjustment_km,
        "Adjustment created"
    );
    Ok(Json(adjustment))
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    pub id: Option<String>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteResponse {
    pub success: bool,
}

async fn delete_adjustment(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<DeleteQuery>, QueryRejection>,
) -> Result<Json<DeleteResponse>> {
    let id = query_params(query)?
        .id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing adjustment ID".to_string()))?;

    if !state.adjustments.delete(&id).await? {
        return Err(AppError::NotFound(format!("Adjustment {} not found", id)));
    }
    state.leaderboard.invalidate();

    tracing::info!(id = %id, "Adjustment deleted");
    Ok(Json(DeleteResponse { success: true }))
}
