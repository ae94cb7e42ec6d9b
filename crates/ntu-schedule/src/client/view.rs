//! Display model for a page of search results
use serde::Serialize;

use crate::schedule::{
    clock_range, course_map_url, format_times, sort_by_day, Course, Locale, PageControls,
    PageState,
};

/// One course as the result table or card shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CourseRow {
    pub id: String,
    pub name: String,
    pub instructor: String,
    pub room: String,
    /// Rendered meeting times, ordered by day
    pub times: Vec<String>,
    /// Wall-clock span of each meeting, in the same order as `times`
    pub clocks: Vec<Option<String>>,
    /// External course-map link, if the id has a section part
    pub link: Option<String>,
}

impl CourseRow {
    pub fn new(course: &Course, locale: Locale) -> Self {
        let times = format_times(&course.time, locale)
            .unwrap_or_else(|_| vec![locale.problem_marker().to_string()]);
        let clocks = sort_by_day(&course.time)
            .into_iter()
            .map(|t| clock_range(&t.start_time, &t.end_time))
            .collect();

        Self {
            id: course.id.clone(),
            name: course.name.clone(),
            instructor: course.instructor.clone(),
            room: course.room.clone(),
            times,
            clocks,
            link: course_map_url(&course.id).map(String::from),
        }
    }
}

/// Everything the UI needs to draw the result list and page controls.
#[derive(Debug, Clone)]
pub struct PageView {
    pub rows: Vec<CourseRow>,
    pub controls: PageControls,
    pub total: u64,
    pub loading: bool,
    pub error: Option<String>,
}

impl PageView {
    pub fn new(
        courses: &[Course],
        state: &PageState,
        loading: bool,
        error: Option<String>,
        locale: Locale,
    ) -> Self {
        Self {
            rows: courses.iter().map(|c| CourseRow::new(c, locale)).collect(),
            controls: PageControls::new(state),
            total: state.total,
            loading,
            error,
        }
    }
}
