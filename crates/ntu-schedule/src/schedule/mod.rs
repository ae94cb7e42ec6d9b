//! Course schedule domain: records, time codes, search filters and pagination
mod error;
mod filter;
mod link;
mod pagination;
mod time;
mod types;

pub use error::ScheduleError;
pub use filter::{SearchFilter, DEPT_PREFIX_LEN};
pub use link::course_map_url;
pub use pagination::{
    next_state, page_count, plan_navigation, plan_new_search, shape_batch, CoursesResponse,
    Cursor, Direction, PageControls, PageRequest, PageState, DEFAULT_PAGE_SIZE,
};
pub use time::{
    clock_range, day_label, format_time, format_times, session_index, session_range, sort_by_day,
    week_label, Locale, SESSIONS,
};
pub use types::{Course, CourseTime, EVEN_WEEKS, EVERY_WEEK, ODD_WEEKS};
