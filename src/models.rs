use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseRecord {
    #[serde(default, deserialize_with = "lenient_text")]
    pub course_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub batch: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub calculated_end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub original_duration_days: Option<f64>,
}

/// Sheet cells arrive as either strings or numbers depending on formatting.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => Some(text),
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    Upcoming,
    InProgress,
    Completed,
    DateError,
}

impl StatusKind {
    pub const ALL: [StatusKind; 4] = [
        StatusKind::Upcoming,
        StatusKind::InProgress,
        StatusKind::Completed,
        StatusKind::DateError,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusKind::Upcoming => "Upcoming",
            StatusKind::InProgress => "In Progress",
            StatusKind::Completed => "Completed",
            StatusKind::DateError => "Date Error",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            StatusKind::Upcoming => "upcoming",
            StatusKind::InProgress => "in-progress",
            StatusKind::Completed => "completed",
            StatusKind::DateError => "date-error",
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for StatusKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace([' ', '_'], "-");
        StatusKind::ALL
            .into_iter()
            .find(|kind| kind.key() == normalized)
            .ok_or_else(|| format!("unknown status '{s}'"))
    }
}

/// Cosmetic bucket for the progress bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressBand {
    Upcoming,
    Low,
    Medium,
    High,
    Error,
}

impl ProgressBand {
    pub fn label(self) -> &'static str {
        match self {
            ProgressBand::Upcoming => "upcoming",
            ProgressBand::Low => "low",
            ProgressBand::Medium => "medium",
            ProgressBand::High => "high",
            ProgressBand::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedCourse {
    pub record: CourseRecord,
    pub status: StatusKind,
    pub progress: f64,
}

impl EnrichedCourse {
    pub fn name(&self) -> &str {
        self.record.course_name.as_deref().unwrap_or("")
    }

    pub fn batch(&self) -> &str {
        self.record.batch.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseSummary {
    pub total: usize,
    pub in_progress: usize,
    pub upcoming: usize,
    pub completed: usize,
    pub date_errors: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CourseFilter {
    #[default]
    All,
    Named(String),
}

impl CourseFilter {
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value == "all" {
            CourseFilter::All
        } else {
            CourseFilter::Named(value.to_string())
        }
    }
}

impl fmt::Display for CourseFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CourseFilter::All => f.write_str("all"),
            CourseFilter::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(StatusKind),
}

impl FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() || s.trim().eq_ignore_ascii_case("all") {
            Ok(StatusFilter::All)
        } else {
            s.parse().map(StatusFilter::Only)
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusFilter::All => f.write_str("all"),
            StatusFilter::Only(kind) => f.write_str(kind.key()),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum SortKey {
    #[default]
    NameAsc,
    NameDesc,
    DateAsc,
    DateDesc,
    ProgressAsc,
    ProgressDesc,
}

impl SortKey {
    pub const ALL: [SortKey; 6] = [
        SortKey::NameAsc,
        SortKey::NameDesc,
        SortKey::DateAsc,
        SortKey::DateDesc,
        SortKey::ProgressAsc,
        SortKey::ProgressDesc,
    ];

    pub fn key(self) -> &'static str {
        match self {
            SortKey::NameAsc => "name-asc",
            SortKey::NameDesc => "name-desc",
            SortKey::DateAsc => "date-asc",
            SortKey::DateDesc => "date-desc",
            SortKey::ProgressAsc => "progress-asc",
            SortKey::ProgressDesc => "progress-desc",
        }
    }

    /// Unrecognised names fall back to `name-asc`.
    pub fn parse_or_default(value: &str) -> Self {
        let normalized = value.trim().to_lowercase();
        SortKey::ALL
            .into_iter()
            .find(|key| key.key() == normalized)
            .unwrap_or_default()
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Criteria {
    pub search_term: String,
    pub course: CourseFilter,
    pub status: StatusFilter,
    pub sort: SortKey,
}

impl Criteria {
    /// True when no filter narrows the collection (sort order is ignored).
    pub fn is_unfiltered(&self) -> bool {
        self.search_term.trim().is_empty()
            && self.course == CourseFilter::All
            && self.status == StatusFilter::All
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_accepts_numeric_batch_and_missing_fields() {
        let record: CourseRecord = serde_json::from_str(
            r#"{"courseName":"Rust","batch":7,"startDate":"01-01-2024","extra":true}"#,
        )
        .unwrap();
        assert_eq!(record.course_name.as_deref(), Some("Rust"));
        assert_eq!(record.batch.as_deref(), Some("7"));
        assert_eq!(record.calculated_end_date, None);
        assert_eq!(record.original_duration_days, None);
    }

    #[test]
    fn record_keeps_non_text_cells_instead_of_failing() {
        let record: CourseRecord = serde_json::from_str(
            r#"{"courseName":101,"startDate":20240101,"calculatedEndDate":null}"#,
        )
        .unwrap();
        assert_eq!(record.course_name.as_deref(), Some("101"));
        assert_eq!(record.start_date.as_deref(), Some("20240101"));
        assert_eq!(record.calculated_end_date, None);
    }

    #[test]
    fn record_reads_duration_from_number_or_text() {
        let numeric: CourseRecord =
            serde_json::from_str(r#"{"originalDurationDays":30}"#).unwrap();
        let textual: CourseRecord =
            serde_json::from_str(r#"{"originalDurationDays":"45"}"#).unwrap();
        assert_eq!(numeric.original_duration_days, Some(30.0));
        assert_eq!(textual.original_duration_days, Some(45.0));
    }

    #[test]
    fn status_parses_keys_and_labels() {
        assert_eq!("in-progress".parse::<StatusKind>(), Ok(StatusKind::InProgress));
        assert_eq!("In Progress".parse::<StatusKind>(), Ok(StatusKind::InProgress));
        assert_eq!("date_error".parse::<StatusKind>(), Ok(StatusKind::DateError));
        assert!("finished".parse::<StatusKind>().is_err());
    }

    #[test]
    fn filters_treat_all_as_passthrough() {
        assert_eq!(CourseFilter::parse("all"), CourseFilter::All);
        assert_eq!(CourseFilter::parse("All"), CourseFilter::Named("All".to_string()));
        assert_eq!(CourseFilter::parse(""), CourseFilter::All);
        assert_eq!(
            CourseFilter::parse(" Web Design "),
            CourseFilter::Named("Web Design".to_string())
        );
        assert_eq!("all".parse::<StatusFilter>(), Ok(StatusFilter::All));
        assert_eq!(
            "completed".parse::<StatusFilter>(),
            Ok(StatusFilter::Only(StatusKind::Completed))
        );
    }

    #[test]
    fn unknown_sort_falls_back_to_name_ascending() {
        assert_eq!(SortKey::parse_or_default("progress-desc"), SortKey::ProgressDesc);
        assert_eq!(SortKey::parse_or_default("by-color"), SortKey::NameAsc);
    }

    #[test]
    fn default_criteria_are_unfiltered() {
        let mut criteria = Criteria::default();
        assert!(criteria.is_unfiltered());
        criteria.sort = SortKey::DateDesc;
        assert!(criteria.is_unfiltered());
        criteria.search_term = "batch".to_string();
        assert!(!criteria.is_unfiltered());
    }
}
