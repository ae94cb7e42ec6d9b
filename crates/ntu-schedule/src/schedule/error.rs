//! Error types for course records and their time codes.

use thiserror::Error;

/// Errors raised while checking or rendering course data.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// A time record cannot be interpreted at all
    #[error("Invalid time record: {reason}")]
    InvalidTimeRecord { reason: String },

    /// A course record is missing or has malformed fields
    #[error("Invalid course {course_id}: {reason}")]
    InvalidCourse { course_id: String, reason: String },
}
