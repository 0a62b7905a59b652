use std::cmp::Ordering;

use chrono::NaiveDate;
use tracing::debug;

use crate::dates;
use crate::models::{CourseFilter, Criteria, EnrichedCourse, SortKey, StatusFilter};

/// Filters and orders `courses` according to `criteria`.
pub fn apply<'a>(courses: &'a [EnrichedCourse], criteria: &Criteria) -> Vec<&'a EnrichedCourse> {
    let term = criteria.search_term.trim().to_lowercase();

    let mut selected: Vec<&EnrichedCourse> = courses
        .iter()
        .filter(|course| matches_course(course, &criteria.course))
        .filter(|course| matches_status(course, criteria.status))
        .filter(|course| matches_search(course, &term))
        .collect();

    debug!(
        "Filtering course='{}' status='{}' search='{}': {} of {} match",
        criteria.course,
        criteria.status,
        term,
        selected.len(),
        courses.len()
    );

    sort(&mut selected, criteria.sort);
    selected
}

fn matches_course(course: &EnrichedCourse, filter: &CourseFilter) -> bool {
    match filter {
        CourseFilter::All => true,
        CourseFilter::Named(name) => course.record.course_name.as_deref() == Some(name.as_str()),
    }
}

fn matches_status(course: &EnrichedCourse, filter: StatusFilter) -> bool {
    match filter {
        StatusFilter::All => true,
        StatusFilter::Only(kind) => course.status == kind,
    }
}

/// `term` must already be trimmed and lowercased.
fn matches_search(course: &EnrichedCourse, term: &str) -> bool {
    term.is_empty()
        || course.name().to_lowercase().contains(term)
        || course.batch().to_lowercase().contains(term)
}

/// Stable sort; ties keep their incoming order.
pub fn sort(courses: &mut [&EnrichedCourse], key: SortKey) {
    match key {
        SortKey::NameAsc => courses.sort_by(|a, b| compare_names(a.name(), b.name())),
        SortKey::NameDesc => courses.sort_by(|a, b| compare_names(b.name(), a.name())),
        SortKey::DateAsc => courses.sort_by(|a, b| compare_start_dates(a, b, false)),
        SortKey::DateDesc => courses.sort_by(|a, b| compare_start_dates(a, b, true)),
        SortKey::ProgressAsc => courses.sort_by(|a, b| a.progress.total_cmp(&b.progress)),
        SortKey::ProgressDesc => courses.sort_by(|a, b| b.progress.total_cmp(&a.progress)),
    }
}

/// Case-insensitive first, then by exact text so the order stays total.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn start_date(course: &EnrichedCourse) -> Option<NaiveDate> {
    dates::parse_field(course.record.start_date.as_deref()).ok()
}

/// Unparseable start dates go last in both directions.
fn compare_start_dates(a: &EnrichedCourse, b: &EnrichedCourse, descending: bool) -> Ordering {
    match (start_date(a), start_date(b)) {
        (Some(left), Some(right)) if descending => right.cmp(&left),
        (Some(left), Some(right)) => left.cmp(&right),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
