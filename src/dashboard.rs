use std::str::FromStr;

use chrono::NaiveDate;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::error::LoadError;
use crate::models::{CourseFilter, Criteria, EnrichedCourse, SortKey, StatusFilter};
use crate::query;
use crate::report;
use crate::source::CourseSource;
use crate::store::CourseStore;

pub const HELP: &str = "\
Commands:
  search <text>        filter by course name or batch (empty clears)
  course <name|all>    show one course only
  status <kind|all>    upcoming, in-progress, completed, date-error
  sort <key>           name-asc, name-desc, date-asc, date-desc, progress-asc, progress-desc
  reset                clear every filter
  courses              list course names
  summary              show summary counts
  show                 redraw the listing
  help                 show this help
  quit                 leave";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Search(String),
    Course(CourseFilter),
    Status(StatusFilter),
    Sort(SortKey),
    Reset,
    Courses,
    Summary,
    Show,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_lowercase().as_str() {
            "search" | "/" => Ok(Command::Search(rest.to_string())),
            "course" => Ok(Command::Course(CourseFilter::parse(rest))),
            "status" => rest.parse().map(Command::Status),
            "sort" => {
                let key = SortKey::parse_or_default(rest);
                if key.key() != rest.to_lowercase() {
                    warn!("Unknown sort order '{rest}', using {key}");
                }
                Ok(Command::Sort(key))
            }
            "reset" => Ok(Command::Reset),
            "courses" => Ok(Command::Courses),
            "summary" => Ok(Command::Summary),
            "show" | "" => Ok(Command::Show),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command '{other}', type 'help'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub output: String,
    pub quit: bool,
}

impl Reply {
    fn show(output: String) -> Self {
        Self { output, quit: false }
    }
}

/// Owns the loaded courses and the criteria currently applied to them.
pub struct Dashboard {
    store: CourseStore,
    criteria: Criteria,
}

impl Dashboard {
    pub fn new(today: NaiveDate, criteria: Criteria) -> Self {
        Self {
            store: CourseStore::new(today),
            criteria,
        }
    }

    /// Fetches once and replaces the stored courses. On failure the store
    /// is left empty.
    pub async fn load(&mut self, source: &CourseSource) -> Result<usize, LoadError> {
        let today = self.store.today();
        match source.fetch().await {
            Ok(records) => Ok(self.store.load(records, today).len()),
            Err(err) => {
                error!("Error during course data fetch: {err}");
                self.store.load(Vec::new(), today);
                Err(err)
            }
        }
    }

    pub fn store(&mut self) -> &mut CourseStore {
        &mut self.store
    }

    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    pub fn visible(&self) -> Vec<&EnrichedCourse> {
        query::apply(self.store.current(), &self.criteria)
    }

    pub fn render(&self) -> String {
        let listing = report::render_listing(&self.visible(), &self.criteria);
        format!(
            "{listing}\n\n{}",
            report::render_summary(&self.store.summary())
        )
    }

    /// Applies one command; criteria changes re-run the query against the
    /// courses already in memory.
    pub fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Search(term) => self.criteria.search_term = term,
            Command::Course(filter) => self.criteria.course = filter,
            Command::Status(filter) => self.criteria.status = filter,
            Command::Sort(key) => self.criteria.sort = key,
            Command::Reset => self.criteria = Criteria::default(),
            Command::Show => {}
            Command::Courses => {
                return Reply::show(report::render_course_names(self.store.distinct_course_names()))
            }
            Command::Summary => return Reply::show(report::render_summary(&self.store.summary())),
            Command::Help => return Reply::show(HELP.to_string()),
            Command::Quit => {
                return Reply {
                    output: String::new(),
                    quit: true,
                }
            }
        }
        info!("Criteria now {}", report::describe_criteria(&self.criteria));
        Reply::show(self.render())
    }

    pub fn handle_line(&mut self, line: &str) -> Reply {
        match line.parse::<Command>() {
            Ok(command) => self.handle(command),
            Err(message) => Reply::show(message),
        }
    }

    /// Reads commands line by line until `quit` or end of input.
    pub async fn run_interactive<R, W>(&mut self, input: R, mut output: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        output.write_all(format!("{}\n\n{HELP}\n> ", self.render()).as_bytes()).await?;
        output.flush().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            let reply = self.handle_line(&line);
            if reply.quit {
                break;
            }
            output.write_all(format!("{}\n> ", reply.output).as_bytes()).await?;
            output.flush().await?;
        }
        output.write_all(b"\n").await?;
        output.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dates;
    use crate::models::{CourseRecord, StatusKind};
    use std::io::Write;

    fn record(name: &str, batch: &str, start: &str, end: &str) -> CourseRecord {
        CourseRecord {
            course_name: Some(name.to_string()),
            batch: Some(batch.to_string()),
            start_date: Some(start.to_string()),
            calculated_end_date: Some(end.to_string()),
            original_duration_days: None,
        }
    }

    fn dashboard() -> Dashboard {
        let today = dates::parse("05-01-2024").unwrap();
        let mut dashboard = Dashboard::new(today, Criteria::default());
        dashboard.store().load(
            vec![
                record("B", "Batch-3", "01-01-2030", "10-01-2030"),
                record("A", "Batch-2", "01-01-2024", "10-01-2024"),
                record("C", "Batch-1", "31-02-2024", "10-03-2024"),
            ],
            today,
        );
        dashboard
    }

    fn visible_names(dashboard: &Dashboard) -> Vec<String> {
        dashboard
            .visible()
            .iter()
            .map(|course| course.name().to_string())
            .collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!("search  Batch-2 ".parse(), Ok(Command::Search("Batch-2".to_string())));
        assert_eq!("search".parse(), Ok(Command::Search(String::new())));
        assert_eq!("course all".parse(), Ok(Command::Course(CourseFilter::All)));
        assert_eq!(
            "course Web Design".parse(),
            Ok(Command::Course(CourseFilter::Named("Web Design".to_string())))
        );
        assert_eq!(
            "status in-progress".parse(),
            Ok(Command::Status(StatusFilter::Only(StatusKind::InProgress)))
        );
        assert_eq!("sort nonsense".parse(), Ok(Command::Sort(SortKey::NameAsc)));
        assert_eq!("QUIT".parse(), Ok(Command::Quit));
        assert!("status finished".parse::<Command>().is_err());
        assert!("dance".parse::<Command>().is_err());
    }

    #[test]
    fn default_view_lists_everything_and_summary() {
        let dashboard = dashboard();
        assert_eq!(visible_names(&dashboard), ["A", "B", "C"]);
        let view = dashboard.render();
        assert!(view.contains("C  [!] invalid dates"));
        assert!(view.ends_with(
            "Total: 2 | In Progress: 1 | Upcoming: 1 | Completed: 0 \
             (1 with invalid dates not counted)"
        ));
    }

    #[test]
    fn commands_refilter_the_same_collection() {
        let mut dashboard = dashboard();

        dashboard.handle_line("search batch-2");
        assert_eq!(visible_names(&dashboard), ["A"]);

        dashboard.handle_line("search");
        dashboard.handle_line("status upcoming");
        assert_eq!(visible_names(&dashboard), ["B"]);

        dashboard.handle_line("status all");
        dashboard.handle_line("sort name-desc");
        assert_eq!(visible_names(&dashboard), ["C", "B", "A"]);

        let reply = dashboard.handle_line("course Z");
        assert!(reply.output.starts_with("No courses found matching your criteria."));

        dashboard.handle_line("reset");
        assert_eq!(dashboard.criteria(), &Criteria::default());
        assert_eq!(dashboard.store().current().len(), 3);
    }

    #[test]
    fn courses_and_help_do_not_change_criteria() {
        let mut dashboard = dashboard();
        assert_eq!(dashboard.handle_line("courses").output, "all\nA\nB\nC");
        assert_eq!(dashboard.handle_line("help").output, HELP);
        assert_eq!(dashboard.criteria(), &Criteria::default());
        assert!(dashboard.handle_line("quit").quit);
    }

    #[tokio::test]
    async fn failed_load_leaves_store_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(br#"{"error":"Sheet not shared"}"#)
            .unwrap();

        let mut dashboard = dashboard();
        let err = dashboard.load(&CourseSource::File(path)).await.unwrap_err();
        assert_eq!(err.to_string(), "API Error: Sheet not shared");
        assert!(dashboard.store().current().is_empty());
    }

    #[tokio::test]
    async fn load_then_interactive_session() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.json");
        std::fs::write(
            &path,
            r#"[{"courseName":"Rust","batch":"Batch-2","startDate":"01-01-2024","calculatedEndDate":"10-01-2024"},
                {"courseName":"Go","batch":"Batch-3","startDate":"01-01-2030","calculatedEndDate":"10-01-2030"}]"#,
        )
        .unwrap();

        let today = dates::parse("05-01-2024").unwrap();
        let mut dashboard = Dashboard::new(today, Criteria::default());
        assert_eq!(dashboard.load(&CourseSource::File(path)).await.unwrap(), 2);

        let input: &[u8] = b"search batch-3\nquit\nsearch never-read\n";
        let mut output = Vec::new();
        dashboard.run_interactive(input, &mut output).await.unwrap();

        let transcript = String::from_utf8(output).unwrap();
        assert!(transcript.contains("Total: 2 | In Progress: 1 | Upcoming: 1 | Completed: 0"));
        assert_eq!(dashboard.criteria().search_term, "batch-3");
        assert_eq!(visible_names(&dashboard), ["Go"]);
    }
}
