//! Upload an X-ray, classify it and resolve care in one call.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::Json;
use serde::Serialize;
use uuid::Uuid;

use super::resolve_blocking;
use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::care::CareRecommendation;
use crate::classifier::{predict, Prediction};

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub request_id: Uuid,
    pub prediction: Prediction,
    pub recommendation: CareRecommendation,
}

/// `POST /api/predictions`: multipart with an `image` file part and an
/// optional `locality` text part.
pub async fn create(
    State(ctx): State<ApiContext>,
    mut multipart: Multipart,
) -> Result<Json<PredictionResponse>, ApiError> {
    let request_id = Uuid::new_v4();
    let classifier = ctx
        .classifier
        .clone()
        .ok_or(ApiError::ClassifierUnavailable)?;

    let mut image: Option<Vec<u8>> = None;
    let mut locality: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read image: {e}")))?;
                image = Some(bytes.to_vec());
            }
            "locality" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read locality: {e}")))?;
                locality = Some(text);
            }
            _ => {}
        }
    }

    let image = image.ok_or_else(|| ApiError::BadRequest("No image provided".into()))?;
    tracing::info!(%request_id, bytes = image.len(), "X-ray received");

    let prediction = tokio::task::spawn_blocking(move || predict(&*classifier, &image))
        .await
        .map_err(|e| ApiError::Internal(format!("Classifier task failed: {e}")))??;

    let recommendation = resolve_blocking(
        Arc::clone(&ctx.resolver),
        prediction.label,
        prediction.confidence_percent,
        locality,
    )
    .await?;

    Ok(Json(PredictionResponse {
        request_id,
        prediction,
        recommendation,
    }))
}
