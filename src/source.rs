use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::models::CourseRecord;

/// Where the course payload comes from. Fetched exactly once per run.
#[derive(Debug, Clone)]
pub enum CourseSource {
    Http { url: String, timeout: Duration },
    File(PathBuf),
}

impl CourseSource {
    pub async fn fetch(&self) -> Result<Vec<CourseRecord>, LoadError> {
        let body = match self {
            CourseSource::Http { url, timeout } => fetch_http(url, *timeout).await?,
            CourseSource::File(path) => {
                info!("Reading course data from {}", path.display());
                tokio::fs::read_to_string(path).await?
            }
        };
        debug!("Raw course payload: {body}");

        let records = parse_payload(&body)?;
        info!("Fetched {} course records", records.len());
        Ok(records)
    }

    pub fn describe(&self) -> String {
        match self {
            CourseSource::Http { url, .. } => url.clone(),
            CourseSource::File(path) => path.display().to_string(),
        }
    }
}

async fn fetch_http(url: &str, timeout: Duration) -> Result<String, LoadError> {
    info!("Fetching course data from {url}");
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await?;

    if !status.is_success() {
        debug!("Fetch failed with {status}; raw response: {body}");
        return Err(match error_field(&body) {
            Some(message) => LoadError::Api(message),
            None => LoadError::Fetch(format!("Status: {status}")),
        });
    }

    Ok(body)
}

/// Validates the payload shape: JSON, top-level array, record elements.
pub fn parse_payload(body: &str) -> Result<Vec<CourseRecord>, LoadError> {
    let value: Value = serde_json::from_str(body).map_err(|err| {
        debug!("Payload is not JSON: {err}");
        LoadError::Shape("Received invalid data format from API.".to_string())
    })?;

    match value {
        Value::Array(_) => serde_json::from_value(value).map_err(|err| {
            LoadError::Shape(format!(
                "Invalid data structure received from API (expected an array of course records): {err}"
            ))
        }),
        other => match api_error(&other) {
            Some(message) => Err(LoadError::Api(message)),
            None => Err(LoadError::Shape(
                "Invalid data structure received from API (expected an array).".to_string(),
            )),
        },
    }
}

fn error_field(body: &str) -> Option<String> {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|value| api_error(&value))
}

fn api_error(value: &Value) -> Option<String> {
    match value.get("error")? {
        Value::Null => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
