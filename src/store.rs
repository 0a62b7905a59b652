use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::models::{CourseRecord, CourseSummary, EnrichedCourse, StatusKind};
use crate::status;

/// Holds exactly one generation of enriched courses.
#[derive(Debug, Clone)]
pub struct CourseStore {
    courses: Vec<EnrichedCourse>,
    today: NaiveDate,
    course_names: Option<Vec<String>>,
}

impl CourseStore {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            courses: Vec::new(),
            today,
            course_names: None,
        }
    }

    /// Enriches `records` against `today` and replaces the current generation.
    pub fn load(&mut self, records: Vec<CourseRecord>, today: NaiveDate) -> &[EnrichedCourse] {
        let courses: Vec<EnrichedCourse> = records
            .into_iter()
            .map(|record| enrich(record, today))
            .collect();

        let rejected = courses
            .iter()
            .filter(|course| course.status == StatusKind::DateError)
            .count();
        if rejected > 0 {
            warn!("{rejected} course(s) have invalid dates and are excluded from summary counts");
        }
        info!("Loaded {} course records as of {}", courses.len(), today);

        self.courses = courses;
        self.today = today;
        self.course_names = None;
        &self.courses
    }

    pub fn current(&self) -> &[EnrichedCourse] {
        &self.courses
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn distinct_course_names(&mut self) -> &[String] {
        let courses = &self.courses;
        self.course_names
            .get_or_insert_with(|| distinct_course_names(courses))
    }

    pub fn summary(&self) -> CourseSummary {
        summarize(&self.courses)
    }
}

pub fn enrich(record: CourseRecord, today: NaiveDate) -> EnrichedCourse {
    let evaluation = status::evaluate(
        record.start_date.as_deref(),
        record.calculated_end_date.as_deref(),
        today,
    );
    EnrichedCourse {
        record,
        status: evaluation.status,
        progress: evaluation.progress,
    }
}

pub fn distinct_course_names(courses: &[EnrichedCourse]) -> Vec<String> {
    courses
        .iter()
        .filter_map(|course| course.record.course_name.as_deref())
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn summarize(courses: &[EnrichedCourse]) -> CourseSummary {
    let mut summary = CourseSummary::default();
    for course in courses {
        match course.status {
            StatusKind::InProgress => summary.in_progress += 1,
            StatusKind::Upcoming => summary.upcoming += 1,
            StatusKind::Completed => summary.completed += 1,
            StatusKind::DateError => {
                summary.date_errors += 1;
                continue;
            }
        }
        summary.total += 1;
    }
    summary
}
