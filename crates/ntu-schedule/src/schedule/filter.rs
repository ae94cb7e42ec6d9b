//! Search filters over the course collection
use serde::{Deserialize, Serialize};

/// Number of leading characters of the department code used for matching.
pub const DEPT_PREFIX_LEN: usize = 3;

/// Text captured from the search form.
///
/// All three fields match case-sensitively; empty fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchFilter {
    /// Department code, e.g. `9020`; only its prefix is compared
    #[serde(default)]
    pub dept_code: String,
    /// Substring of the course name
    #[serde(default)]
    pub course_name: String,
    /// Substring of the instructor name
    #[serde(default)]
    pub instructor: String,
}

impl SearchFilter {
    pub fn new(dept_code: &str, course_name: &str, instructor: &str) -> Self {
        Self {
            dept_code: dept_code.to_string(),
            course_name: course_name.to_string(),
            instructor: instructor.to_string(),
        }
    }

    /// Returns the filter with the department code cut down to its prefix.
    pub fn normalized(&self) -> Self {
        Self {
            dept_code: self.dept_code.chars().take(DEPT_PREFIX_LEN).collect(),
            course_name: self.course_name.clone(),
            instructor: self.instructor.clone(),
        }
    }

    /// Anchored pattern the course id must match.
    pub fn id_pattern(&self) -> String {
        format!("^{}", regex::escape(&self.normalized().dept_code))
    }

    /// Pattern the course name must contain.
    pub fn name_pattern(&self) -> String {
        regex::escape(&self.normalized().course_name)
    }

    /// Pattern the instructor name must contain.
    pub fn instructor_pattern(&self) -> String {
        regex::escape(&self.normalized().instructor)
    }
}
