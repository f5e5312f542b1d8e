//! Due date helpers for display.
//!
//! Every function takes the current time explicitly; day boundaries are UTC.

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};
use entities::{Task, TaskStatus};

const DAY_MILLIS: i64 = 24 * 60 * 60 * 1000;

/// Attention state of a task's due date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// Due before today.
    Overdue,
    /// Due today or within the next three days.
    DueSoon,
}

impl DueStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Overdue => "Overdue",
            Self::DueSoon => "Due soon",
        }
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Formats a date as `Jan 15, 2024`, or `Not set`.
pub fn format_display(date: Option<DateTime<Utc>>) -> String {
    match date {
        Some(date) => date.format("%b %-d, %Y").to_string(),
        None => "Not set".to_string(),
    }
}

/// Formats a date for a date input field (`YYYY-MM-DD`), empty when unset.
pub fn format_input(date: Option<DateTime<Utc>>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = DateTime::parse_from_rfc3339(input) {
        return Some(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(start_of_day)
}

/// True if `due` falls before the start of today.
pub fn is_overdue(due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    due < start_of_day(now.date_naive())
}

/// True if `due` falls between the start of today and the end of the third
/// day from now.
pub fn is_due_soon(due: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    let today = now.date_naive();
    let start = start_of_day(today);
    match today.checked_add_days(Days::new(4)) {
        Some(limit) => due >= start && due < start_of_day(limit),
        None => due >= start,
    }
}

/// Attention state for a task. Completed tasks and tasks without a due date
/// never need attention.
pub fn due_status(task: &Task, now: DateTime<Utc>) -> Option<DueStatus> {
    if task.status == TaskStatus::Completed {
        return None;
    }
    let due = task.due_date?;
    if is_overdue(due, now) {
        Some(DueStatus::Overdue)
    } else if is_due_soon(due, now) {
        Some(DueStatus::DueSoon)
    } else {
        None
    }
}

/// Whole days from `now` until `date`, rounded up.
pub fn days_until(date: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let millis = (date - now).num_milliseconds();
    -(-millis).div_euclid(DAY_MILLIS)
}

/// Describes `date` relative to `now`: `Today`, `Tomorrow`, `Yesterday`,
/// `In 3 days` or `3 days ago`.
pub fn relative_time(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    match days_until(date, now) {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        -1 => "Yesterday".to_string(),
        days if days > 1 => format!("In {} days", days),
        days => format!("{} days ago", -days),
    }
}

/// True unless both dates are set and the end precedes the start.
pub fn validate_date_range(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> bool {
    match (start, end) {
        (Some(start), Some(end)) => end >= start,
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    use super::*;

    fn noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_format() {
        let date = noon(2024, 1, 5);
        assert_eq!(format_display(Some(date)), "Jan 5, 2024");
        assert_eq!(format_display(None), "Not set");
        assert_eq!(format_input(Some(date)), "2024-01-05");
        assert_eq!(format_input(None), "");
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2024-03-10"),
            Some(Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap())
        );
        assert_eq!(parse_date("2024-03-10T12:00:00Z"), Some(noon(2024, 3, 10)));
        assert_eq!(parse_date("next tuesday"), None);
    }

    #[test]
    fn test_overdue_uses_start_of_day() {
        let now = noon(2024, 6, 10);
        // Earlier today is not overdue yet.
        assert!(!is_overdue(now - Duration::hours(6), now));
        assert!(is_overdue(noon(2024, 6, 9), now));
    }

    #[test]
    fn test_due_soon_window() {
        let now = noon(2024, 6, 10);
        assert!(is_due_soon(noon(2024, 6, 10), now));
        assert!(is_due_soon(Utc.with_ymd_and_hms(2024, 6, 13, 23, 59, 0).unwrap(), now));
        assert!(!is_due_soon(noon(2024, 6, 14), now));
        assert!(!is_due_soon(noon(2024, 6, 9), now));
    }

    #[test]
    fn test_due_status() {
        let now = noon(2024, 6, 10);
        let mut task = Task::new(Uuid::new_v4(), "Ship", Uuid::new_v4());
        assert_eq!(due_status(&task, now), None);

        task.due_date = Some(noon(2024, 6, 1));
        assert_eq!(due_status(&task, now), Some(DueStatus::Overdue));

        task.due_date = Some(noon(2024, 6, 11));
        assert_eq!(due_status(&task, now), Some(DueStatus::DueSoon));

        task.due_date = Some(noon(2024, 7, 1));
        assert_eq!(due_status(&task, now), None);

        task.due_date = Some(noon(2024, 6, 1));
        task.set_status_at(TaskStatus::Completed, now);
        assert_eq!(due_status(&task, now), None);
    }

    #[test]
    fn test_relative_time() {
        let now = noon(2024, 6, 10);
        assert_eq!(relative_time(now, now), "Today");
        assert_eq!(relative_time(now + Duration::hours(20), now), "Tomorrow");
        assert_eq!(relative_time(now - Duration::hours(30), now), "Yesterday");
        assert_eq!(relative_time(now + Duration::days(5), now), "In 5 days");
        assert_eq!(relative_time(now - Duration::days(4), now), "4 days ago");
    }

    #[test]
    fn test_validate_date_range() {
        let start = noon(2024, 1, 1);
        assert!(validate_date_range(Some(start), Some(start)));
        assert!(validate_date_range(Some(start), None));
        assert!(!validate_date_range(Some(start), Some(start - Duration::days(1))));
    }
}
