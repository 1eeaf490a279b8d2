// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore-backed adjustment store.
//!
//! Adjustments live in the `km_adjustments` collection, one document per
//! adjustment, keyed by the adjustment ID.

use crate::db::{collections, AdjustmentStore};
use crate::error::AppError;
use crate::models::{Adjustment, AdjustmentFilter, NewAdjustment};
use async_trait::async_trait;

/// Firestore adjustment store.
#[derive(Clone)]
pub struct FirestoreAdjustmentStore {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreAdjustmentStore {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline store for testing.
    ///
    /// All operations return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    fn document_id(id: &str) -> String {
        urlencoding::encode(id).into_owned()
    }
}

#[async_trait]
impl AdjustmentStore for FirestoreAdjustmentStore {
    async fn list(&self, filter: &AdjustmentFilter) -> Result<Vec<Adjustment>, AppError> {
        let date = filter.date.map(|d| d.to_string());
        let range = filter
            .range
            .map(|(start, end)| (start.to_string(), end.to_string()));
        let bib_number = filter.bib_number;

        let mut adjustments: Vec<Adjustment> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::KM_ADJUSTMENTS)
            .filter(move |q| {
                q.for_all([
                    date.clone().and_then(|d| q.field("date").eq(d)),
                    range
                        .clone()
                        .and_then(|(start, _)| q.field("date").greater_than_or_equal(start)),
                    range
                        .clone()
                        .and_then(|(_, end)| q.field("date").less_than_or_equal(end)),
                    bib_number.and_then(|b| q.field("bibNumber").eq(b)),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        adjustments.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(adjustments)
    }

    async fn create(&self, new: NewAdjustment) -> Result<Adjustment, AppError> {
        let adjustment = Adjustment::from_new(new, chrono::Utc::now());

        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::KM_ADJUSTMENTS)
            .document_id(Self::document_id(&adjustment.id))
            .object(&adjustment)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(
            id = %adjustment.id,
            bib_number = adjustment.bib_number,
            date = %adjustment.date,
            adjustment_km = adjustment.adjustment_km,
            "Stored km adjustment"
        );
        Ok(adjustment)
    }

    async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let client = self.get_client()?;
        let doc_id = Self::document_id(id);

        let existing: Option<Adjustment> = client
            .fluent()
            .select()
            .by_id_in(collections::KM_ADJUSTMENTS)
            .obj()
            .one(&doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        if existing.is_none() {
            return Ok(false);
        }

        client
            .fluent()
            .delete()
            .from(collections::KM_ADJUSTMENTS)
            .document_id(&doc_id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        tracing::info!(id = %id, "Deleted km adjustment");
        Ok(true)
    }
}
