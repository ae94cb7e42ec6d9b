//! Cursor-based pagination over the course collection.
//!
//! Pages are addressed relative to the page currently displayed: moving
//! forward continues after the last record shown, moving backward continues
//! before the first one, and any pages jumped over are skipped. The total is
//! counted only when a new search starts and is reused while navigating, so
//! it can drift from the live collection within a long session.
//!
//! Everything here is pure: the caller owns a [`PageState`], asks for the
//! [`PageRequest`] that reaches a target page, and folds the response back in
//! with [`next_state`].

use serde::{Deserialize, Serialize};

use super::filter::SearchFilter;
use super::types::Course;

/// Page size used by the browser UI.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sort direction of a fetch, derived from its cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending by store identifier
    Forward,
    /// Descending by store identifier
    Backward,
}

/// Boundary record a fetch continues from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cursor {
    /// Records strictly after this identifier (wire name `last`)
    After(String),
    /// Records strictly before this identifier (wire name `first`)
    Before(String),
}

impl Cursor {
    pub fn direction(&self) -> Direction {
        match self {
            Cursor::After(_) => Direction::Forward,
            Cursor::Before(_) => Direction::Backward,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Cursor::After(id) | Cursor::Before(id) => id,
        }
    }
}

/// One fetch against the course collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub filter: SearchFilter,
    /// Page size; `None` returns every match
    pub max_num: Option<u32>,
    pub skip: u64,
    pub cursor: Option<Cursor>,
}

impl PageRequest {
    pub fn direction(&self) -> Direction {
        self.cursor
            .as_ref()
            .map_or(Direction::Forward, Cursor::direction)
    }

    /// Requests without a cursor start a new search and carry a fresh total.
    pub fn is_new_search(&self) -> bool {
        self.cursor.is_none()
    }

    /// Query string parameters understood by `GET /api/courses`.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("deptCode", self.filter.dept_code.clone()),
            ("courseName", self.filter.course_name.clone()),
            ("instructor", self.filter.instructor.clone()),
            ("skip", self.skip.to_string()),
        ];

        if let Some(max_num) = self.max_num {
            pairs.push(("maxNum", max_num.to_string()));
        }

        match &self.cursor {
            Some(Cursor::After(id)) => pairs.push(("last", id.clone())),
            Some(Cursor::Before(id)) => pairs.push(("first", id.clone())),
            None => {}
        }

        pairs
    }
}

/// Body of a successful `GET /api/courses`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoursesResponse {
    pub courses: Vec<Course>,
    /// Present on new-search responses only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

/// What the client remembers about the page on display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageState {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub first_id: Option<String>,
    pub last_id: Option<String>,
}

impl PageState {
    pub fn new(page_size: u32) -> Self {
        Self {
            page: 1,
            page_size,
            total: 0,
            first_id: None,
            last_id: None,
        }
    }

    pub fn page_count(&self) -> u32 {
        page_count(self.total, self.page_size)
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// Number of pages needed for `total` records.
pub fn page_count(total: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }

    u32::try_from(total.div_ceil(u64::from(page_size))).unwrap_or(u32::MAX)
}

/// Request for the first page of a new search.
pub fn plan_new_search(filter: &SearchFilter, page_size: u32) -> PageRequest {
    PageRequest {
        filter: filter.clone(),
        max_num: Some(page_size),
        skip: 0,
        cursor: None,
    }
}

/// Request that moves from the current page to `target`.
///
/// Returns `None` when no request should be issued: the target is outside
/// `1..=page_count`, equals the current page, or there is no page on display
/// to continue from.
pub fn plan_navigation(
    state: &PageState,
    filter: &SearchFilter,
    target: u32,
) -> Option<PageRequest> {
    if target < 1 || target > state.page_count() || target == state.page {
        return None;
    }

    let distance = target.abs_diff(state.page);
    let skip = u64::from(distance - 1) * u64::from(state.page_size);

    let cursor = if target > state.page {
        Cursor::After(state.last_id.clone()?)
    } else {
        Cursor::Before(state.first_id.clone()?)
    };

    Some(PageRequest {
        filter: filter.clone(),
        max_num: Some(state.page_size),
        skip,
        cursor: Some(cursor),
    })
}

/// Puts a fetched batch into ascending display order.
pub fn shape_batch(mut batch: Vec<Course>, direction: Direction) -> Vec<Course> {
    if direction == Direction::Backward {
        batch.reverse();
    }
    batch
}

/// State after a shaped response for `target` has been displayed.
pub fn next_state(prev: &PageState, target: u32, response: &CoursesResponse) -> PageState {
    let (Some(first), Some(last)) = (response.courses.first(), response.courses.last()) else {
        return PageState::new(prev.page_size);
    };

    PageState {
        page: target,
        page_size: prev.page_size,
        total: response.total.unwrap_or(prev.total),
        first_id: Some(first.object_id.clone()),
        last_id: Some(last.object_id.clone()),
    }
}

/// Links shown by the pagination control around the current page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageControls {
    pub page: u32,
    pub page_count: u32,
    pub previous_enabled: bool,
    pub next_enabled: bool,
    /// Neighbouring page links, `page - 1` and `page + 1` when they exist
    pub previous_page: Option<u32>,
    pub next_page: Option<u32>,
    pub leading_ellipsis: bool,
    pub trailing_ellipsis: bool,
}

impl PageControls {
    pub fn new(state: &PageState) -> Self {
        let page = state.page;
        let page_count = state.page_count();

        Self {
            page,
            page_count,
            previous_enabled: page > 1,
            next_enabled: page < page_count,
            previous_page: (page > 1).then(|| page - 1),
            next_page: (page < page_count).then(|| page + 1),
            leading_ellipsis: page == page_count && page > 2,
            trailing_ellipsis: page == 1 && page + 1 < page_count,
        }
    }

    /// Pages offered by the jump-to-page selector.
    pub fn selectable_pages(&self) -> Vec<u32> {
        if self.page_count > 1 {
            (1..=self.page_count).collect()
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(n: u32) -> Course {
        Course {
            object_id: format!("{n:024x}"),
            id: format!("CSIE{n:04} 01"),
            name: String::new(),
            instructor: String::new(),
            room: String::new(),
            time: vec![],
        }
    }

    fn state_on(page: u32, total: u64, first: u32, last: u32) -> PageState {
        PageState {
            page,
            page_size: 20,
            total,
            first_id: Some(format!("{first:024x}")),
            last_id: Some(format!("{last:024x}")),
        }
    }

    #[test]
    fn test_page_count() {
        assert_eq!(page_count(45, 20), 3);
        assert_eq!(page_count(40, 20), 2);
        assert_eq!(page_count(0, 20), 0);
        assert_eq!(page_count(10, 0), 0);
    }

    #[test]
    fn test_new_search_starts_at_beginning() {
        let filter = SearchFilter::new("902", "", "");
        let request = plan_new_search(&filter, 20);

        assert!(request.is_new_search());
        assert_eq!(request.skip, 0);
        assert_eq!(request.max_num, Some(20));
        assert_eq!(request.direction(), Direction::Forward);
    }

    #[test]
    fn test_forward_navigation_skips_jumped_pages() {
        let state = state_on(1, 45, 1, 20);
        let request = plan_navigation(&state, &SearchFilter::default(), 3).unwrap();

        assert_eq!(request.skip, 20);
        assert_eq!(request.cursor, Some(Cursor::After(format!("{:024x}", 20))));
        assert_eq!(request.direction(), Direction::Forward);
    }

    #[test]
    fn test_backward_navigation_uses_first_id() {
        let state = state_on(3, 45, 41, 45);
        let request = plan_navigation(&state, &SearchFilter::default(), 2).unwrap();

        assert_eq!(request.skip, 0);
        assert_eq!(request.cursor, Some(Cursor::Before(format!("{:024x}", 41))));
        assert_eq!(request.direction(), Direction::Backward);
    }

    #[test]
    fn test_out_of_range_targets_are_noops() {
        let state = state_on(2, 45, 21, 40);
        let filter = SearchFilter::default();

        assert_eq!(plan_navigation(&state, &filter, 0), None);
        assert_eq!(plan_navigation(&state, &filter, 4), None);
        assert_eq!(plan_navigation(&state, &filter, 2), None);
    }

    #[test]
    fn test_navigation_without_displayed_page_is_noop() {
        let state = PageState {
            total: 45,
            ..PageState::default()
        };
        assert_eq!(plan_navigation(&state, &SearchFilter::default(), 2), None);
    }

    #[test]
    fn test_backward_batches_are_reversed() {
        let batch = vec![course(3), course(2), course(1)];
        let shaped = shape_batch(batch.clone(), Direction::Backward);
        assert_eq!(shaped, vec![course(1), course(2), course(3)]);

        assert_eq!(shape_batch(batch.clone(), Direction::Forward), batch);
    }

    #[test]
    fn test_next_state_reuses_total_while_navigating() {
        let prev = state_on(1, 45, 1, 20);
        let response = CoursesResponse {
            courses: (41..=45).map(course).collect(),
            total: None,
        };

        let next = next_state(&prev, 3, &response);
        assert_eq!(next.page, 3);
        assert_eq!(next.total, 45);
        assert_eq!(next.first_id, Some(format!("{:024x}", 41)));
        assert_eq!(next.last_id, Some(format!("{:024x}", 45)));
    }

    #[test]
    fn test_empty_response_resets_state() {
        let prev = state_on(2, 45, 21, 40);
        let response = CoursesResponse {
            courses: vec![],
            total: Some(0),
        };

        let next = next_state(&prev, 1, &response);
        assert_eq!(next, PageState::new(20));
    }

    #[test]
    fn test_query_pairs() {
        let request = PageRequest {
            filter: SearchFilter::new("9020", "演算法", ""),
            max_num: Some(20),
            skip: 40,
            cursor: Some(Cursor::Before("abc".to_string())),
        };

        let pairs = request.to_query_pairs();
        assert!(pairs.contains(&("deptCode", "9020".to_string())));
        assert!(pairs.contains(&("maxNum", "20".to_string())));
        assert!(pairs.contains(&("skip", "40".to_string())));
        assert!(pairs.contains(&("first", "abc".to_string())));
        assert!(!pairs.iter().any(|(k, _)| *k == "last"));
    }

    #[test]
    fn test_controls_on_first_page() {
        let controls = PageControls::new(&state_on(1, 45, 1, 20));

        assert!(!controls.previous_enabled);
        assert!(controls.next_enabled);
        assert_eq!(controls.previous_page, None);
        assert_eq!(controls.next_page, Some(2));
        assert!(controls.trailing_ellipsis);
        assert!(!controls.leading_ellipsis);
        assert_eq!(controls.selectable_pages(), vec![1, 2, 3]);
    }

    #[test]
    fn test_controls_on_last_page() {
        let controls = PageControls::new(&state_on(3, 45, 41, 45));

        assert!(controls.previous_enabled);
        assert!(!controls.next_enabled);
        assert_eq!(controls.previous_page, Some(2));
        assert!(controls.leading_ellipsis);
        assert!(!controls.trailing_ellipsis);
    }

    #[test]
    fn test_controls_single_page() {
        let controls = PageControls::new(&state_on(1, 5, 1, 5));

        assert!(!controls.previous_enabled);
        assert!(!controls.next_enabled);
        assert!(!controls.trailing_ellipsis);
        assert!(controls.selectable_pages().is_empty());
    }
}
