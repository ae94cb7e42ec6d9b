//! Search state of one UI session.
//!
//! Every search or navigation bumps a generation counter. A response is only
//! applied if no newer action was started while it was in flight, so a slow
//! response can never overwrite the result of a later one.

use tracing::{debug, warn};

use super::error::ClientError;
use super::view::PageView;
use super::PageSource;
use crate::schedule::{
    next_state, plan_navigation, plan_new_search, Course, CoursesResponse, Locale, PageRequest,
    PageState, SearchFilter,
};

/// What happened to a response handed to [`SearchSession::complete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The response is now on display
    Applied,
    /// A newer action superseded the request; the response was dropped
    Stale,
    /// No request was needed
    Skipped,
}

/// A request issued by the session and not yet completed.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    generation: u64,
    target: u32,
    filter: SearchFilter,
    pub request: PageRequest,
}

impl PendingRequest {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone)]
pub struct SearchSession {
    filter: SearchFilter,
    state: PageState,
    courses: Vec<Course>,
    loading: bool,
    last_error: Option<String>,
    generation: u64,
    locale: Locale,
}

impl SearchSession {
    pub fn new(page_size: u32) -> Self {
        Self {
            filter: SearchFilter::default(),
            state: PageState::new(page_size),
            courses: Vec::new(),
            loading: false,
            last_error: None,
            generation: 0,
            locale: Locale::default(),
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    pub fn filter(&self) -> &SearchFilter {
        &self.filter
    }

    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Starts a new search from page 1.
    pub fn begin_search(&mut self, filter: SearchFilter) -> PendingRequest {
        let filter = filter.normalized();
        let request = plan_new_search(&filter, self.state.page_size);
        self.issue(1, filter, request)
    }

    /// Starts moving to `target`, or returns `None` if there is nothing to fetch.
    pub fn begin_navigation(&mut self, target: u32) -> Option<PendingRequest> {
        let Some(request) = plan_navigation(&self.state, &self.filter, target) else {
            debug!(target, page = self.state.page, "Ignoring navigation");
            return None;
        };

        Some(self.issue(target, self.filter.clone(), request))
    }

    fn issue(&mut self, target: u32, filter: SearchFilter, request: PageRequest) -> PendingRequest {
        self.generation += 1;
        self.loading = true;
        self.last_error = None;

        PendingRequest {
            generation: self.generation,
            target,
            filter,
            request,
        }
    }

    /// Applies the outcome of a pending request.
    ///
    /// Failures clear the rows and are recorded for display before being
    /// returned; the page position and cursors are kept so the user can retry.
    pub fn complete(
        &mut self,
        pending: PendingRequest,
        result: Result<CoursesResponse, ClientError>,
    ) -> Result<Completion, ClientError> {
        if pending.generation != self.generation {
            debug!(
                generation = pending.generation,
                current = self.generation,
                "Dropping stale response"
            );
            return Ok(Completion::Stale);
        }

        self.loading = false;

        match result {
            Ok(response) => {
                if pending.request.is_new_search() {
                    self.filter = pending.filter;
                    // A new search always replaces the total
                    self.state.total = response.total.unwrap_or(0);
                }
                self.state = next_state(&self.state, pending.target, &response);
                self.courses = response.courses;
                Ok(Completion::Applied)
            }
            Err(e) => {
                warn!(error = %e, "Failed to load course page");
                self.courses.clear();
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Runs a new search to completion.
    pub async fn search<S: PageSource>(
        &mut self,
        source: &S,
        filter: SearchFilter,
    ) -> Result<Completion, ClientError> {
        let pending = self.begin_search(filter);
        let result = source.fetch(&pending.request).await;
        self.complete(pending, result)
    }

    /// Navigates to `target` and waits for the page.
    pub async fn go_to<S: PageSource>(
        &mut self,
        source: &S,
        target: u32,
    ) -> Result<Completion, ClientError> {
        let Some(pending) = self.begin_navigation(target) else {
            return Ok(Completion::Skipped);
        };
        let result = source.fetch(&pending.request).await;
        self.complete(pending, result)
    }

    /// Display model of the current page.
    pub fn view(&self) -> PageView {
        PageView::new(
            &self.courses,
            &self.state,
            self.loading,
            self.last_error.clone(),
            self.locale,
        )
    }
}
