use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::server::endpoints::courses::store_error_response;
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// GET /health
pub async fn get_health() -> Response {
    (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response()
}

/// GET /api/metadata/update_time
/// Returns when the course data was last ingested
pub async fn get_update_time(State(s): State<Arc<AppState>>) -> Response {
    info!("GET /api/metadata/update_time");

    match s.catalog.update_time().await {
        Ok(Some(update)) => (StatusCode::OK, Json(update)).into_response(),
        Ok(None) => ApiErrorType::from((
            StatusCode::NOT_FOUND,
            "No data update time recorded",
            None,
        ))
        .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to read data update time");
            store_error_response(&e)
        }
    }
}
