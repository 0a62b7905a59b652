use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod dashboard;
mod dates;
mod error;
mod models;
mod query;
mod report;
mod source;
mod status;
mod store;

use config::Config;
use dashboard::Dashboard;
use models::{CourseFilter, Criteria, SortKey, StatusFilter};

#[derive(Parser)]
#[command(name = "course-dashboard")]
#[command(about = "Course batch progress dashboard", long_about = None)]
struct Cli {
    /// Course data endpoint (falls back to COURSE_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Read the course payload from a local JSON file instead
    #[arg(long, global = true)]
    file: Option<PathBuf>,
    /// HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = 15)]
    timeout_secs: u64,
    /// Reference date as DD-MM-YYYY (defaults to today, UTC)
    #[arg(long, global = true)]
    today: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct CriteriaArgs {
    /// Case-insensitive match on course name or batch
    #[arg(long, default_value = "")]
    search: String,
    /// Exact course name, or "all"
    #[arg(long, default_value = "all")]
    course: String,
    /// upcoming, in-progress, completed, date-error or "all"
    #[arg(long, default_value = "all")]
    status: String,
    #[arg(long, value_enum, default_value_t = SortKey::NameAsc)]
    sort: SortKey,
}

impl CriteriaArgs {
    fn into_criteria(self) -> anyhow::Result<Criteria> {
        let status: StatusFilter = self.status.parse().map_err(anyhow::Error::msg)?;
        Ok(Criteria {
            search_term: self.search,
            course: CourseFilter::parse(&self.course),
            status,
            sort: self.sort,
        })
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print course cards and summary counts
    List {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
    /// Print summary counts only
    Summary,
    /// Print the distinct course names
    Courses,
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        criteria: CriteriaArgs,
        #[arg(long, default_value = "course-report.md")]
        out: PathBuf,
    },
    /// Export the filtered courses as CSV
    Export {
        #[command(flatten)]
        criteria: CriteriaArgs,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Filter and sort interactively from stdin
    Interactive {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },
}

impl Commands {
    fn criteria(&self) -> anyhow::Result<Criteria> {
        match self {
            Commands::List { criteria }
            | Commands::Report { criteria, .. }
            | Commands::Export { criteria, .. }
            | Commands::Interactive { criteria } => criteria.clone().into_criteria(),
            Commands::Summary | Commands::Courses => Ok(Criteria::default()),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "course_dashboard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::resolve(cli.api_url, cli.file, cli.timeout_secs, cli.today.as_deref())?;
    let mut dashboard = Dashboard::new(config.today, cli.command.criteria()?);

    let loaded = match config.source() {
        Ok(source) => {
            eprintln!("{}", report::loading_message(&source.describe()));
            dashboard.load(source).await
        }
        Err(err) => Err(err),
    };
    if let Err(err) = loaded {
        println!("{}", report::error_message(&err));
        return Ok(ExitCode::FAILURE);
    }

    match cli.command {
        Commands::List { .. } => {
            println!("{}", dashboard.render());
        }
        Commands::Summary => {
            println!("{}", report::render_summary(&dashboard.store().summary()));
        }
        Commands::Courses => {
            println!(
                "{}",
                report::render_course_names(dashboard.store().distinct_course_names())
            );
        }
        Commands::Report { out, .. } => {
            let today = dashboard.store().today();
            let summary = dashboard.store().summary();
            let names = dashboard.store().distinct_course_names().to_vec();
            let markdown = report::build_report(
                today,
                dashboard.criteria(),
                &summary,
                &names,
                &dashboard.visible(),
            );
            std::fs::write(&out, markdown)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Export { out, .. } => {
            let visible = dashboard.visible();
            match out {
                Some(path) => {
                    let file = std::fs::File::create(&path)
                        .with_context(|| format!("failed to create {}", path.display()))?;
                    report::write_csv(file, &visible)?;
                    println!("Exported {} courses to {}.", visible.len(), path.display());
                }
                None => report::write_csv(std::io::stdout().lock(), &visible)?,
            }
        }
        Commands::Interactive { .. } => {
            let input = BufReader::new(tokio::io::stdin());
            dashboard.run_interactive(input, tokio::io::stdout()).await?;
        }
    }

    Ok(ExitCode::SUCCESS)
}
