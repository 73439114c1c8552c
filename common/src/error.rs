use config::ConfigError;
use reqwest::StatusCode;
use thiserror::Error;

// Core internal errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Search API transport error: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("Search API responded with status {0}")]
    UpstreamStatus(StatusCode),
    #[error("Search API payload error: {0}")]
    UpstreamPayload(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl AppError {
    /// True for the failures that come from talking to the search API rather
    /// than from our own input handling.
    pub const fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Reqwest(_) | Self::UpstreamStatus(_) | Self::UpstreamPayload(_)
        )
    }
}
