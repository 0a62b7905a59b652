use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;

use crate::dates;
use crate::models::{CourseSummary, Criteria, EnrichedCourse, StatusKind};
use crate::status;

const BAR_WIDTH: usize = 20;

pub fn loading_message(source: &str) -> String {
    format!("Loading course data from {source}, please wait...")
}

pub fn error_message(err: &dyn std::fmt::Display) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "Failed to load course data.");
    let _ = writeln!(output, "{err}");
    let _ = write!(
        output,
        "Run with RUST_LOG=course_dashboard=debug for details and verify the API configuration."
    );
    output
}

pub fn empty_message(criteria: &Criteria) -> &'static str {
    if criteria.is_unfiltered() {
        "No courses available to display."
    } else {
        "No courses found matching your criteria."
    }
}

pub fn duration_label(days: Option<f64>) -> String {
    match days {
        Some(days) if days != 0.0 && days.is_finite() => {
            if days.fract() == 0.0 {
                format!("{days:.0} days")
            } else {
                format!("{days} days")
            }
        }
        _ => "N/A".to_string(),
    }
}

pub fn progress_bar(progress: f64) -> String {
    let filled = ((progress.clamp(0.0, 100.0) / 100.0) * BAR_WIDTH as f64).round() as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn or_na(value: Option<&str>) -> &str {
    match value {
        Some(text) if !text.trim().is_empty() => text,
        _ => "N/A",
    }
}

pub fn render_card(course: &EnrichedCourse) -> String {
    let record = &course.record;
    let name = match record.course_name.as_deref() {
        Some(name) if !name.trim().is_empty() => name,
        _ => "Unknown Course",
    };

    let mut output = String::new();
    if course.status == StatusKind::DateError {
        let _ = writeln!(output, "{name}  [!] invalid dates");
    } else {
        let _ = writeln!(output, "{name}");
    }
    let _ = writeln!(output, "  Batch:         {}", or_na(record.batch.as_deref()));
    let _ = writeln!(output, "  Start Date:    {}", or_na(record.start_date.as_deref()));
    let _ = writeln!(output, "  End Date:      {}", or_na(record.calculated_end_date.as_deref()));
    let _ = writeln!(
        output,
        "  Org. Duration: {}",
        duration_label(record.original_duration_days)
    );
    let _ = writeln!(output, "  Status:        {}", course.status.label());
    let _ = write!(
        output,
        "  Progress:      {} {:>5.1}% ({})",
        progress_bar(course.progress),
        course.progress,
        status::band(course.status, course.progress).label()
    );
    output
}

pub fn render_listing(courses: &[&EnrichedCourse], criteria: &Criteria) -> String {
    if courses.is_empty() {
        return empty_message(criteria).to_string();
    }
    courses
        .iter()
        .map(|course| render_card(course))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn render_summary(summary: &CourseSummary) -> String {
    let mut output = format!(
        "Total: {} | In Progress: {} | Upcoming: {} | Completed: {}",
        summary.total, summary.in_progress, summary.upcoming, summary.completed
    );
    if summary.date_errors > 0 {
        let _ = write!(output, " ({} with invalid dates not counted)", summary.date_errors);
    }
    output
}

pub fn render_course_names(names: &[String]) -> String {
    if names.is_empty() {
        return "No course names available.".to_string();
    }
    let mut output = String::from("all");
    for name in names {
        let _ = write!(output, "\n{name}");
    }
    output
}

pub fn describe_criteria(criteria: &Criteria) -> String {
    let search = criteria.search_term.trim();
    format!(
        "course={} status={} search='{}' sort={}",
        criteria.course, criteria.status, search, criteria.sort
    )
}

pub fn build_report(
    today: NaiveDate,
    criteria: &Criteria,
    summary: &CourseSummary,
    course_names: &[String],
    courses: &[&EnrichedCourse],
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Course Progress Report");
    let _ = writeln!(
        output,
        "Generated for {} ({})",
        dates::format(today),
        describe_criteria(criteria)
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Summary");
    let _ = writeln!(output, "- Total: {}", summary.total);
    let _ = writeln!(output, "- In progress: {}", summary.in_progress);
    let _ = writeln!(output, "- Upcoming: {}", summary.upcoming);
    let _ = writeln!(output, "- Completed: {}", summary.completed);
    if summary.date_errors > 0 {
        let _ = writeln!(output, "- Invalid dates (not counted): {}", summary.date_errors);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Courses Offered");
    if course_names.is_empty() {
        let _ = writeln!(output, "No course names recorded.");
    } else {
        for name in course_names {
            let _ = writeln!(output, "- {name}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Batches");
    if courses.is_empty() {
        let _ = writeln!(output, "{}", empty_message(criteria));
    } else {
        let _ = writeln!(output, "| Course | Batch | Start | End | Duration | Status | Progress |");
        let _ = writeln!(output, "|---|---|---|---|---|---|---|");
        for course in courses {
            let record = &course.record;
            let _ = writeln!(
                output,
                "| {} | {} | {} | {} | {} | {} | {:.1}% |",
                or_na(record.course_name.as_deref()),
                or_na(record.batch.as_deref()),
                or_na(record.start_date.as_deref()),
                or_na(record.calculated_end_date.as_deref()),
                duration_label(record.original_duration_days),
                course.status.label(),
                course.progress
            );
        }
    }

    output
}

#[derive(Serialize)]
struct CsvRow<'a> {
    course_name: &'a str,
    batch: &'a str,
    start_date: &'a str,
    end_date: &'a str,
    original_duration_days: String,
    status: &'static str,
    progress: String,
}

pub fn write_csv<W: std::io::Write>(writer: W, courses: &[&EnrichedCourse]) -> anyhow::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for course in courses {
        let record = &course.record;
        writer.serialize(CsvRow {
            course_name: course.name(),
            batch: course.batch(),
            start_date: record.start_date.as_deref().unwrap_or(""),
            end_date: record.calculated_end_date.as_deref().unwrap_or(""),
            original_duration_days: record
                .original_duration_days
                .map(|days| days.to_string())
                .unwrap_or_default(),
            status: course.status.key(),
            progress: format!("{:.1}", course.progress),
        })?;
    }
    writer.flush()?;
    Ok(())
}
