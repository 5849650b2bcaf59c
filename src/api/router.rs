//! API router.
//!
//! Returns a composable `Router` with every endpoint under `/api/`.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::api::endpoints;
use crate::api::types::ApiContext;
use crate::classifier::MAX_IMAGE_BYTES;

/// Build the API router.
pub fn api_router(ctx: ApiContext) -> Router {
    Router::new()
        .route("/api/health", get(endpoints::health::check))
        .route("/api/recommendations", post(endpoints::recommendations::create))
        .route("/api/predictions", post(endpoints::predictions::create))
        .route("/api/reports", post(endpoints::reports::create))
        // Image ceiling plus multipart overhead.
        .layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES + 1024 * 1024))
        .with_state(ctx)
}
