use std::sync::Arc;
use std::time::Duration;

use axum::http::{header::CONTENT_TYPE, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::server::endpoints::{courses, status};
use crate::types::AppState;

mod endpoints;
mod types;

/// Creates a router that can be used by `axum`.
///
/// # Parameters
/// - `app_state`: The app server state.
///
/// # Returns
/// The router.
pub fn create_router(app_state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    let api_router = Router::new()
        .route("/courses", get(courses::get_courses))
        .route("/metadata/update_time", get(status::get_update_time));

    Router::new()
        .route("/health", get(status::get_health))
        .nest("/api", api_router)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(app_state)
}
