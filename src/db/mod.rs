//! Adjustment storage layer.

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreAdjustmentStore;
pub use memory::MemoryAdjustmentStore;

use crate::error::AppError;
use crate::models::{Adjustment, AdjustmentFilter, NewAdjustment};
use async_trait::async_trait;

/// Collection names as constants.
pub mod collections {
    pub const KM_ADJUSTMENTS: &str = "km_adjustments";
}

/// Storage contract for km adjustments.
///
/// Each call is independent: list-filter, append, and remove-by-id.
#[async_trait]
pub trait AdjustmentStore: Send + Sync {
    /// List adjustments matching `filter`, oldest first.
    async fn list(&self, filter: &AdjustmentFilter) -> Result<Vec<Adjustment>, AppError>;

    /// Append a new adjustment and return the stored record.
    async fn create(&self, new: NewAdjustment) -> Result<Adjustment, AppError>;

    /// Remove an adjustment. Returns `false` if no adjustment had this ID.
    async fn delete(&self, id: &str) -> Result<bool, AppError>;
}
