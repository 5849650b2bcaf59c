//! Care recommendation for an already-known label.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use super::resolve_blocking;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::care::{CareRecommendation, Label};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub label: String,
    pub confidence_percent: f64,
    #[serde(default)]
    pub locality: Option<String>,
}

/// `POST /api/recommendations`
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Result<Json<CareRecommendation>, ApiError> {
    let Json(req) = payload?;
    let label: Label = req.label.parse()?;
    let rec = resolve_blocking(ctx.resolver.clone(), label, req.confidence_percent, req.locality).await?;
    Ok(Json(rec))
}
