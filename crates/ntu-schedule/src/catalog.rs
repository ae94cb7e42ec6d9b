//! Executes page requests against the course store.
//!
//! Store calls block, so they run on tokio's blocking pool and each one is
//! bound by the configured query timeout. A call that runs out of time is
//! interrupted inside SQLite, so it gives its connection back. A new search issues one count and
//! one bounded find; navigation issues only the find.

use chrono::NaiveDateTime;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::db::{Cancellation, ScheduleDb, StoreError};
use crate::schedule::{shape_batch, CoursesResponse, PageRequest};

/// Format the ingestion job uses for its update timestamp.
const UPDATE_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Last ingestion time of the course data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataUpdateTime {
    /// Value as recorded, e.g. `2024-09-01 12:30`
    pub raw: String,
    /// Parsed local time, absent if the recorded value is not in the expected format
    pub parsed: Option<NaiveDateTime>,
}

/// Course lookups shared by all requests.
#[derive(Clone)]
pub struct Catalog {
    db: Arc<ScheduleDb>,
    query_timeout: Duration,
}

impl Catalog {
    pub fn new(db: Arc<ScheduleDb>, query_timeout: Duration) -> Self {
        Self { db, query_timeout }
    }

    /// Fetches one page and puts it into ascending display order.
    ///
    /// The total is only counted for requests without a cursor.
    pub async fn page(&self, request: PageRequest) -> Result<CoursesResponse, StoreError> {
        let start = Instant::now();

        let total = if request.is_new_search() {
            let filter = request.filter.clone();
            Some(self.run(move |db, cancel| db.count_courses(&filter, cancel)).await?)
        } else {
            None
        };

        let direction = request.direction();
        let batch = self.run(move |db, cancel| db.find_courses(&request, cancel)).await?;
        let courses = shape_batch(batch, direction);

        info!(
            returned = courses.len(),
            total = ?total,
            duration_ms = start.elapsed().as_millis() as u64,
            "Served course page"
        );

        Ok(CoursesResponse { courses, total })
    }

    /// Reads the recorded data update time, if any.
    pub async fn update_time(&self) -> Result<Option<DataUpdateTime>, StoreError> {
        let raw = self.run(|db, cancel| db.data_update_time(cancel)).await?;

        Ok(raw.map(|raw| {
            let parsed = NaiveDateTime::parse_from_str(&raw, UPDATE_TIME_FORMAT).ok();
            if parsed.is_none() {
                warn!(value = %raw, "Data update time is not in the expected format");
            }
            DataUpdateTime { raw, parsed }
        }))
    }

    fn run<T, F>(&self, op: F) -> impl Future<Output = Result<T, StoreError>>
    where
        T: Send + 'static,
        F: FnOnce(&ScheduleDb, &Cancellation) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        let limit = self.query_timeout;
        let cancel = Cancellation::new();

        async move {
            let worker = cancel.clone();
            let task = tokio::task::spawn_blocking(move || op(db.as_ref(), &worker));
            match tokio::time::timeout(limit, task).await {
                Ok(joined) => joined?,
                Err(_) => {
                    cancel.cancel();
                    warn!(limit_ms = limit.as_millis() as u64, "Store operation timed out");
                    Err(StoreError::Timeout {
                        elapsed_ms: limit.as_millis() as u64,
                    })
                }
            }
        }
    }
}
