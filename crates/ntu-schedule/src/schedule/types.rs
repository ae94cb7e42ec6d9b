//! Types for course schedule records
use serde::{Deserialize, Serialize};

use super::error::ScheduleError;

/// Week value meaning the course meets every week.
pub const EVERY_WEEK: i32 = 0;
/// Week value meaning the course meets on odd weeks only.
pub const ODD_WEEKS: i32 = -1;
/// Week value meaning the course meets on even weeks only.
pub const EVEN_WEEKS: i32 = -2;

/// One weekly meeting of a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTime {
    /// `[0]`, `[-1]`, `[-2]`, or a list of explicit week numbers
    pub weeks: Vec<i32>,
    /// 0 = Sunday
    pub day: u8,
    pub start_time: String,
    pub end_time: String,
}

impl CourseTime {
    /// Rejects records the formatter has no interpretation for.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.weeks.is_empty() {
            return Err(ScheduleError::InvalidTimeRecord {
                reason: "weeks must contain at least one entry".to_string(),
            });
        }

        if self.day > 6 {
            return Err(ScheduleError::InvalidTimeRecord {
                reason: format!("day {} is outside 0..=6", self.day),
            });
        }

        Ok(())
    }
}

/// A course section as stored in the schedule collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Store-assigned identifier, only used as a pagination cursor
    #[serde(rename = "_id")]
    pub object_id: String,

    /// Course identifier and section, e.g. `CSIE1212 01-1`
    pub id: String,

    pub name: String,
    pub instructor: String,
    pub room: String,
    pub time: Vec<CourseTime>,
}

impl Course {
    /// Checks every time record of this course.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.object_id.is_empty() {
            return Err(ScheduleError::InvalidCourse {
                course_id: self.id.clone(),
                reason: "missing store identifier".to_string(),
            });
        }

        for time in &self.time {
            time.validate().map_err(|e| ScheduleError::InvalidCourse {
                course_id: self.id.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}
