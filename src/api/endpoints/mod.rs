//! API endpoint handlers.

pub mod health;
pub mod predictions;
pub mod recommendations;
pub mod reports;

use std::sync::Arc;

use crate::api::error::ApiError;
use crate::care::{CareRecommendation, CareResolver, Label};

/// Run the (possibly network-bound) resolver off the async executor.
pub(crate) async fn resolve_blocking(
    resolver: Arc<CareResolver>,
    label: Label,
    confidence_percent: f64,
    locality: Option<String>,
) -> Result<CareRecommendation, ApiError> {
    tokio::task::spawn_blocking(move || {
        resolver.resolve(label, confidence_percent, locality.as_deref())
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Resolver task failed: {e}")))
}
