//! HTTP access to the course service.

use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use super::error::ClientError;
use super::PageSource;
use crate::schedule::{CoursesResponse, PageRequest};

const COURSES_PATH: &str = "api/courses";

/// Fetches course pages from `GET /api/courses`.
pub struct HttpCourseClient {
    client: Client,
    endpoint: Url,
}

impl HttpCourseClient {
    /// Creates a client for the service at `base_url`, e.g. `http://localhost:8080/`.
    ///
    /// Every request is abandoned after `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let endpoint = base.join(COURSES_PATH)?;

        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self { client, endpoint })
    }

    /// Full request URL for a page request.
    pub fn request_url(&self, request: &PageRequest) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().extend_pairs(request.to_query_pairs());
        url
    }
}

impl PageSource for HttpCourseClient {
    async fn fetch(&self, request: &PageRequest) -> Result<CoursesResponse, ClientError> {
        let url = self.request_url(request);
        debug!(url = %url, "Fetching course page");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Course service returned an error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = response.text().await?;
        let page: CoursesResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::Validation {
                message: e.to_string(),
            })?;

        for course in &page.courses {
            course.validate().map_err(|e| ClientError::Validation {
                message: e.to_string(),
            })?;
        }

        Ok(page)
    }
}
