//! Client side of the course search: fetching pages and keeping the state a
//! browser UI renders from.

mod error;
mod http;
mod session;
mod view;

pub use error::ClientError;
pub use http::HttpCourseClient;
pub use session::{Completion, PendingRequest, SearchSession};
pub use view::{CourseRow, PageView};

use std::future::Future;

use crate::catalog::Catalog;
use crate::schedule::{CoursesResponse, PageRequest};

/// Anything that can answer a page request.
pub trait PageSource {
    fn fetch(
        &self,
        request: &PageRequest,
    ) -> impl Future<Output = Result<CoursesResponse, ClientError>> + Send;
}

/// In-process access, for rendering pages next to the store.
impl PageSource for Catalog {
    async fn fetch(&self, request: &PageRequest) -> Result<CoursesResponse, ClientError> {
        Ok(self.page(request.clone()).await?)
    }
}
