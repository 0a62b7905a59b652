use chrono::{NaiveDate, Utc};

use crate::dates;
use crate::models::{ProgressBand, StatusKind};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Evaluation {
    pub status: StatusKind,
    pub progress: f64,
}

impl Evaluation {
    const fn fixed(status: StatusKind, progress: f64) -> Self {
        Self { status, progress }
    }
}

/// Derives status and progress for a course relative to `today`.
pub fn evaluate(start: Option<&str>, end: Option<&str>, today: NaiveDate) -> Evaluation {
    match (dates::parse_field(start), dates::parse_field(end)) {
        (Ok(start), Ok(end)) => evaluate_dates(start, end, today),
        (start_result, end_result) => {
            if let Err(err) = start_result.and(end_result) {
                tracing::debug!("date error: {err}");
            }
            Evaluation::fixed(StatusKind::DateError, 0.0)
        }
    }
}

pub fn evaluate_dates(start: NaiveDate, end: NaiveDate, today: NaiveDate) -> Evaluation {
    if end < start {
        return Evaluation::fixed(StatusKind::DateError, 0.0);
    }
    if today < start {
        return Evaluation::fixed(StatusKind::Upcoming, 0.0);
    }
    if today >= end {
        return Evaluation::fixed(StatusKind::Completed, 100.0);
    }

    // All dates sit on UTC midnight, so whole days scale exactly like milliseconds.
    let total = (end - start).num_days();
    let elapsed = (today - start).num_days();
    let progress = if total > 0 {
        (elapsed as f64 / total as f64 * 100.0).min(100.0)
    } else {
        100.0
    };

    Evaluation::fixed(StatusKind::InProgress, progress)
}

pub fn band(status: StatusKind, progress: f64) -> ProgressBand {
    match status {
        StatusKind::Upcoming => ProgressBand::Upcoming,
        StatusKind::Completed => ProgressBand::High,
        StatusKind::DateError => ProgressBand::Error,
        StatusKind::InProgress => match progress {
            p if p < 35.0 => ProgressBand::Low,
            p if p < 75.0 => ProgressBand::Medium,
            _ => ProgressBand::High,
        },
    }
}

pub fn today_utc() -> NaiveDate {
    Utc::now().date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(value: &str) -> NaiveDate {
        dates::parse(value).unwrap()
    }

    #[test]
    fn reversed_dates_are_errors_for_any_today() {
        for today in ["01-01-2000", "05-01-2024", "01-01-2100"] {
            let result = evaluate(Some("10-01-2024"), Some("01-01-2024"), day(today));
            assert_eq!(result, Evaluation::fixed(StatusKind::DateError, 0.0));
        }
    }

    #[test]
    fn unparseable_or_missing_dates_are_errors() {
        let today = day("05-01-2024");
        assert_eq!(
            evaluate(Some("31-02-2024"), Some("10-03-2024"), today).status,
            StatusKind::DateError
        );
        assert_eq!(evaluate(None, Some("10-03-2024"), today).status, StatusKind::DateError);
        assert_eq!(evaluate(Some("01-01-2024"), Some("soon"), today).progress, 0.0);
    }

    #[test]
    fn before_start_is_upcoming() {
        let result = evaluate(Some("01-01-2030"), Some("10-01-2030"), day("05-01-2024"));
        assert_eq!(result, Evaluation::fixed(StatusKind::Upcoming, 0.0));
    }

    #[test]
    fn midway_progress_is_proportional() {
        let result = evaluate(Some("01-01-2024"), Some("10-01-2024"), day("05-01-2024"));
        assert_eq!(result.status, StatusKind::InProgress);
        assert!((result.progress - 400.0 / 9.0).abs() < 1e-9);
    }

    #[test]
    fn start_day_is_in_progress_at_zero() {
        let result = evaluate(Some("01-01-2024"), Some("10-01-2024"), day("01-01-2024"));
        assert_eq!(result, Evaluation::fixed(StatusKind::InProgress, 0.0));
    }

    #[test]
    fn end_day_and_after_are_completed() {
        for today in ["10-01-2024", "11-01-2024", "01-01-2099"] {
            let result = evaluate(Some("01-01-2024"), Some("10-01-2024"), day(today));
            assert_eq!(result, Evaluation::fixed(StatusKind::Completed, 100.0));
        }
    }

    #[test]
    fn zero_length_course_completes_on_its_day() {
        let result = evaluate(Some("01-01-2024"), Some("01-01-2024"), day("01-01-2024"));
        assert_eq!(result, Evaluation::fixed(StatusKind::Completed, 100.0));
        let before = evaluate(Some("01-01-2024"), Some("01-01-2024"), day("31-12-2023"));
        assert_eq!(before.status, StatusKind::Upcoming);
    }

    #[test]
    fn in_progress_stays_below_one_hundred() {
        let start = day("01-01-2024");
        let end = day("31-12-2024");
        let mut today = start;
        while today < end {
            let result = evaluate_dates(start, end, today);
            assert_eq!(result.status, StatusKind::InProgress);
            assert!((0.0..100.0).contains(&result.progress));
            today = today.succ_opt().unwrap();
        }
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(band(StatusKind::InProgress, 10.0), ProgressBand::Low);
        assert_eq!(band(StatusKind::InProgress, 35.0), ProgressBand::Medium);
        assert_eq!(band(StatusKind::InProgress, 74.9), ProgressBand::Medium);
        assert_eq!(band(StatusKind::InProgress, 75.0), ProgressBand::High);
        assert_eq!(band(StatusKind::Completed, 100.0), ProgressBand::High);
        assert_eq!(band(StatusKind::Upcoming, 0.0), ProgressBand::Upcoming);
        assert_eq!(band(StatusKind::DateError, 0.0), ProgressBand::Error);
    }
}
