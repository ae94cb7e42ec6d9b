//! Rendering of compact course time codes.
//!
//! A time record names a day of the week, an inclusive range of session codes
//! and a week pattern. Rendering never fails on unknown codes: the affected
//! part is replaced with the locale's problem marker. The only hard error is a
//! record without any week entry, which has no interpretation.

use super::error::ScheduleError;
use super::types::{CourseTime, EVEN_WEEKS, EVERY_WEEK, ODD_WEEKS};

/// Daily session codes in chronological order.
pub const SESSIONS: [&str; 15] = [
    "0", "1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "A", "B", "C", "D",
];

/// Wall-clock start and end of each session, indexed like [`SESSIONS`].
const SESSION_CLOCK: [(&str, &str); 15] = [
    ("07:10", "08:00"),
    ("08:10", "09:00"),
    ("09:10", "10:00"),
    ("10:20", "11:10"),
    ("11:20", "12:10"),
    ("12:20", "13:10"),
    ("13:20", "14:10"),
    ("14:20", "15:10"),
    ("15:30", "16:20"),
    ("16:30", "17:20"),
    ("17:30", "18:20"),
    ("18:25", "19:15"),
    ("19:20", "20:10"),
    ("20:15", "21:05"),
    ("21:10", "22:00"),
];

/// Display language for rendered time strings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Locale {
    #[default]
    ZhTw,
    En,
}

struct Labels {
    odd_week: &'static str,
    even_week: &'static str,
    weeks_open: &'static str,
    weeks_close: &'static str,
    days: [&'static str; 7],
    problem: &'static str,
}

static ZH_TW: Labels = Labels {
    odd_week: "（單週）",
    even_week: "（雙週）",
    weeks_open: "（第 ",
    weeks_close: " 週）",
    days: ["日", "一", "二", "三", "四", "五", "六"],
    problem: "此筆資料有問題",
};

static EN: Labels = Labels {
    odd_week: "(odd week)",
    even_week: "(even week)",
    weeks_open: "(weeks ",
    weeks_close: ")",
    days: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    problem: "(data problem)",
};

impl Locale {
    fn labels(self) -> &'static Labels {
        match self {
            Locale::ZhTw => &ZH_TW,
            Locale::En => &EN,
        }
    }

    /// Marker shown in place of data that cannot be interpreted.
    pub fn problem_marker(self) -> &'static str {
        self.labels().problem
    }
}

/// Position of a session code in [`SESSIONS`].
pub fn session_index(code: &str) -> Option<usize> {
    SESSIONS.iter().position(|s| *s == code)
}

/// Concatenates every session code from `start` to `end` inclusive.
///
/// Returns `None` if either code is unknown or the range is reversed.
pub fn session_range(start: &str, end: &str) -> Option<String> {
    let start = session_index(start)?;
    let end = session_index(end)?;
    if start > end {
        return None;
    }

    Some(SESSIONS[start..=end].concat())
}

/// Wall-clock span covered by a session range, e.g. `09:10-12:10`.
pub fn clock_range(start: &str, end: &str) -> Option<String> {
    let start = session_index(start)?;
    let end = session_index(end)?;
    if start > end {
        return None;
    }

    Some(format!("{}-{}", SESSION_CLOCK[start].0, SESSION_CLOCK[end].1))
}

/// Label for the week pattern; empty for courses meeting every week.
pub fn week_label(weeks: &[i32], locale: Locale) -> Result<String, ScheduleError> {
    let labels = locale.labels();

    let label = match weeks {
        [] => {
            return Err(ScheduleError::InvalidTimeRecord {
                reason: "weeks must contain at least one entry".to_string(),
            })
        }
        [EVERY_WEEK] => String::new(),
        [ODD_WEEKS] => labels.odd_week.to_string(),
        [EVEN_WEEKS] => labels.even_week.to_string(),
        [_] => labels.problem.to_string(),
        many if many.iter().any(|w| *w <= 0) => labels.problem.to_string(),
        many => format!("{}{}{}", labels.weeks_open, join_weeks(many), labels.weeks_close),
    };

    Ok(label)
}

/// Weekday name, 0 = Sunday.
pub fn day_label(day: u8, locale: Locale) -> &'static str {
    let labels = locale.labels();
    labels
        .days
        .get(usize::from(day))
        .copied()
        .unwrap_or(labels.problem)
}

/// Renders one time record as `[week label] day sessions`.
pub fn format_time(time: &CourseTime, locale: Locale) -> Result<String, ScheduleError> {
    let week = week_label(&time.weeks, locale)?;
    Ok(assemble(&week, time, locale))
}

/// Orders time records by day. The sort is stable, so records on the same
/// day keep their input order.
pub fn sort_by_day(times: &[CourseTime]) -> Vec<&CourseTime> {
    let mut ordered: Vec<&CourseTime> = times.iter().collect();
    ordered.sort_by_key(|t| t.day);
    ordered
}

/// Renders all time records of a course in [`sort_by_day`] order. Every
/// record carries its own week label.
pub fn format_times(times: &[CourseTime], locale: Locale) -> Result<Vec<String>, ScheduleError> {
    sort_by_day(times)
        .into_iter()
        .map(|time| format_time(time, locale))
        .collect()
}

fn assemble(week: &str, time: &CourseTime, locale: Locale) -> String {
    let sessions = session_range(&time.start_time, &time.end_time)
        .unwrap_or_else(|| locale.problem_marker().to_string());
    let day = day_label(time.day, locale);

    if week.is_empty() {
        format!("{day} {sessions}")
    } else {
        format!("{week} {day} {sessions}")
    }
}

fn join_weeks(weeks: &[i32]) -> String {
    let mut sorted = weeks.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .map(|w| w.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
