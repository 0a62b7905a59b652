use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;

use crate::dates;
use crate::error::LoadError;
use crate::source::CourseSource;
use crate::status;

pub const API_URL_ENV: &str = "COURSE_API_URL";
const URL_PLACEHOLDER: &str = "YOUR_APPS_SCRIPT_WEB_APP_URL_HERE";
const MIN_URL_LEN: usize = 20;

#[derive(Debug, Clone)]
pub struct Config {
    source: Option<CourseSource>,
    pub today: NaiveDate,
}

impl Config {
    /// Resolves the data source and reference date. A local file wins over
    /// any URL; a flag wins over the environment.
    pub fn resolve(
        api_url: Option<String>,
        file: Option<PathBuf>,
        timeout_secs: u64,
        today: Option<&str>,
    ) -> anyhow::Result<Self> {
        let today = match today {
            Some(value) => dates::parse(value).context("--today must be a DD-MM-YYYY date")?,
            None => status::today_utc(),
        };

        let source = match file {
            Some(path) => Some(CourseSource::File(path)),
            None => api_url
                .or_else(|| std::env::var(API_URL_ENV).ok())
                .and_then(|url| validate_url(&url))
                .map(|url| CourseSource::Http {
                    url,
                    timeout: Duration::from_secs(timeout_secs.max(1)),
                }),
        };

        Ok(Self { source, today })
    }

    pub fn source(&self) -> Result<&CourseSource, LoadError> {
        self.source.as_ref().ok_or(LoadError::NotConfigured)
    }
}

fn validate_url(url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() || url == URL_PLACEHOLDER || url.len() < MIN_URL_LEN {
        tracing::warn!("Ignoring unusable API URL '{url}'");
        return None;
    }
    Some(url.to_string())
}
