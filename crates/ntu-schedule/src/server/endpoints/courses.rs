use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::db::StoreError;
use crate::schedule::{Cursor, PageRequest, SearchFilter};
use crate::server::types::ApiErrorType;
use crate::types::AppState;

/// Query parameters of `GET /api/courses`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseQueryParams {
    #[serde(default)]
    pub dept_code: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub course_name: String,
    /// Page size; omitted means every match
    pub max_num: Option<u32>,
    #[serde(default)]
    pub skip: u64,
    /// Continue before this identifier
    pub first: Option<String>,
    /// Continue after this identifier
    pub last: Option<String>,
}

impl CourseQueryParams {
    fn into_request(self) -> Result<PageRequest, ApiErrorType> {
        let cursor = match (self.first, self.last) {
            (Some(_), Some(_)) => {
                return Err(ApiErrorType::from((
                    StatusCode::BAD_REQUEST,
                    "Invalid pagination cursor",
                    Some("`first` and `last` cannot be combined".to_string()),
                )))
            }
            (Some(first), None) => Some(Cursor::Before(first)),
            (None, Some(last)) => Some(Cursor::After(last)),
            (None, None) => None,
        };

        Ok(PageRequest {
            filter: SearchFilter {
                dept_code: self.dept_code,
                course_name: self.course_name,
                instructor: self.instructor,
            }
            .normalized(),
            max_num: self.max_num,
            skip: self.skip,
            cursor,
        })
    }
}

/// GET /api/courses
/// Returns one page of courses matching the filters, in ascending order
pub async fn get_courses(
    State(s): State<Arc<AppState>>,
    Query(params): Query<CourseQueryParams>,
) -> Response {
    info!(
        dept_code = %params.dept_code,
        course_name = %params.course_name,
        instructor = %params.instructor,
        max_num = ?params.max_num,
        skip = params.skip,
        "GET /api/courses"
    );

    let request = match params.into_request() {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    match s.catalog.page(request).await {
        Ok(page) => (StatusCode::OK, Json(page)).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to fetch courses");
            store_error_response(&e)
        }
    }
}

/// Store failures are reported to clients without internal details.
pub(crate) fn store_error_response(error: &StoreError) -> Response {
    let message = match error {
        StoreError::Timeout { .. } | StoreError::Cancelled => "Timed out fetching data",
        StoreError::Transport { .. } | StoreError::Validation { .. } => "Failed to fetch data",
    };

    ApiErrorType::from((StatusCode::INTERNAL_SERVER_ERROR, message, None)).into_response()
}
