use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("'{0}' is not a DD-MM-YYYY date")]
    Malformed(String),

    #[error("'{0}' has a day, month or year outside the accepted range")]
    OutOfRange(String),

    #[error("'{0}' is not a real calendar date")]
    InvalidCalendarDate(String),
}

/// Failures that end a load attempt. None of them are retried.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("API URL is not configured. Pass --api-url or set COURSE_API_URL.")]
    NotConfigured,

    #[error("Network response error. {0}")]
    Fetch(String),

    #[error("{0}")]
    Shape(String),

    #[error("API Error: {0}")]
    Api(String),

    #[error("Could not read course data: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => LoadError::Fetch(format!("Status: {status}")),
            None => LoadError::Fetch(err.to_string()),
        }
    }
}
