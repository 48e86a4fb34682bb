use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    ConfigError(String),
    FetchError(String),
    PersistenceError(String),
}

impl AppError {
    /// Short stage name used in log lines and exit reporting.
    pub fn stage(&self) -> &'static str {
        match self {
            AppError::ConfigError(_) => "configuration",
            AppError::FetchError(_) => "fetch",
            AppError::PersistenceError(_) => "persistence",
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            AppError::FetchError(msg) => write!(f, "Fetch error: {}", msg),
            AppError::PersistenceError(msg) => write!(f, "Persistence error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::PersistenceError(err.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::FetchError(format!("HTTP request error: {}", err))
    }
}
