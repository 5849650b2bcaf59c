//! PDF report download.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::care::Label;
use crate::config::REPORT_FILE_NAME;
use crate::report::{render_report, write_report, ReportFields, MAX_PATIENT_NAME_CHARS};

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub name: String,
    pub age: u32,
    pub label: String,
    pub confidence_percent: f64,
}

/// `POST /api/reports`: returns the PDF and keeps a copy in the reports dir.
pub async fn create(
    State(ctx): State<ApiContext>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Patient name is required".into()));
    }
    if name.chars().count() > MAX_PATIENT_NAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Patient name exceeds {MAX_PATIENT_NAME_CHARS} characters"
        )));
    }
    let label: Label = req.label.parse()?;

    // No locality: the report carries no hospitals, so this never hits the network.
    let rec = ctx.resolver.resolve(label, req.confidence_percent, None);
    let fields = ReportFields::from_recommendation(name, req.age, &rec);
    let reports_dir = ctx.reports_dir.clone();

    let bytes = tokio::task::spawn_blocking(move || -> Result<Vec<u8>, ApiError> {
        let bytes = render_report(&fields)?;
        write_report(&bytes, &reports_dir)?;
        Ok(bytes)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Report task failed: {e}")))??;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{REPORT_FILE_NAME}\""),
            ),
        ],
        bytes,
    ))
}
