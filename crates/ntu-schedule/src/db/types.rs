//! Database types for course schedule data
use crate::schedule::{Course, CourseTime, ScheduleError};

/// A course row as stored, with its time records still encoded as JSON.
#[derive(Debug, Clone)]
pub struct DbCourse {
    pub object_id: String,
    pub id: String,
    pub name: String,
    pub instructor: String,
    pub room: String,
    pub time: String, // JSON array of time records
}

impl TryFrom<DbCourse> for Course {
    type Error = ScheduleError;

    fn try_from(row: DbCourse) -> Result<Self, Self::Error> {
        let time: Vec<CourseTime> =
            serde_json::from_str(&row.time).map_err(|e| ScheduleError::InvalidCourse {
                course_id: row.id.clone(),
                reason: format!("malformed time column: {e}"),
            })?;

        let course = Course {
            object_id: row.object_id,
            id: row.id,
            name: row.name,
            instructor: row.instructor,
            room: row.room,
            time,
        };
        course.validate()?;

        Ok(course)
    }
}
