use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::webdriver::WebDriverError;
use crate::workflows::easy_apply::{AnswerStoreError, FillerError, LedgerError};
use std::fmt;

/// Top-level error surfaced by the command-line entry points.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Browser(WebDriverError),
    Ledger(LedgerError),
    Answers(AnswerStoreError),
    Workflow(FillerError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Browser(err) => write!(f, "browser error: {}", err),
            AppError::Ledger(err) => write!(f, "ledger error: {}", err),
            AppError::Answers(err) => write!(f, "answer cache error: {}", err),
            AppError::Workflow(err) => write!(f, "workflow error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Browser(err) => Some(err),
            AppError::Ledger(err) => Some(err),
            AppError::Answers(err) => Some(err),
            AppError::Workflow(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<WebDriverError> for AppError {
    fn from(value: WebDriverError) -> Self {
        Self::Browser(value)
    }
}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<AnswerStoreError> for AppError {
    fn from(value: AnswerStoreError) -> Self {
        Self::Answers(value)
    }
}

impl From<FillerError> for AppError {
    fn from(value: FillerError) -> Self {
        Self::Workflow(value)
    }
}
