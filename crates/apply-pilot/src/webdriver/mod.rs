//! Browser automation over the W3C WebDriver protocol.
//!
//! [`WebDriverClient`] speaks the JSON wire protocol to a running chromedriver; [`LinkedInDriver`]
//! layers the job board's pages on top of it and implements [`SessionDriver`].
//!
//! [`SessionDriver`]: crate::workflows::easy_apply::SessionDriver

mod client;
mod linkedin;

use std::time::Duration;

pub use client::{BrowserOptions, ElementRef, Locator, WebDriverClient, ELEMENT_KEY, USER_AGENTS};
pub use linkedin::{search_url, LinkedInDriver, LinkedInSettings};

use crate::workflows::easy_apply::DriverError;

/// W3C error codes that usually clear up on a second attempt.
const TRANSIENT_CODES: [&str; 8] = [
    "no such element",
    "stale element reference",
    "element not interactable",
    "element click intercepted",
    "move target out of bounds",
    "timeout",
    "script timeout",
    "unknown error",
];

const SESSION_LOST_CODES: [&str; 3] = ["invalid session id", "no such window", "session not created"];

#[derive(Debug, thiserror::Error)]
pub enum WebDriverError {
    #[error("webdriver request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{command}: {error}: {message}")]
    Command {
        command: String,
        error: String,
        message: String,
    },
    #[error("unexpected webdriver response: {0}")]
    Protocol(String),
    #[error("gave up after {waited:?} waiting for {target}")]
    Timeout { waited: Duration, target: String },
}

impl WebDriverError {
    pub fn is_session_lost(&self) -> bool {
        match self {
            WebDriverError::Http(err) => err.is_connect(),
            WebDriverError::Command { error, .. } => SESSION_LOST_CODES.contains(&error.as_str()),
            WebDriverError::Protocol(_) | WebDriverError::Timeout { .. } => false,
        }
    }

    pub fn is_transient(&self) -> bool {
        match self {
            WebDriverError::Http(err) => !err.is_connect(),
            WebDriverError::Command { error, .. } => TRANSIENT_CODES.contains(&error.as_str()),
            WebDriverError::Timeout { .. } => true,
            WebDriverError::Protocol(_) => false,
        }
    }
}

impl From<WebDriverError> for DriverError {
    fn from(value: WebDriverError) -> Self {
        if value.is_session_lost() {
            DriverError::SessionLost(value.to_string())
        } else if value.is_transient() {
            DriverError::Transient(value.to_string())
        } else {
            DriverError::UnexpectedForm(value.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command_error(code: &str) -> WebDriverError {
        WebDriverError::Command {
            command: "/element".to_string(),
            error: code.to_string(),
            message: "detail".to_string(),
        }
    }

    #[test]
    fn stale_elements_are_retried() {
        let err: DriverError = command_error("stale element reference").into();
        assert!(err.is_transient());
    }

    #[test]
    fn closed_windows_end_the_session() {
        let err: DriverError = command_error("no such window").into();
        assert!(matches!(err, DriverError::SessionLost(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn invalid_arguments_are_form_problems() {
        let err: DriverError = command_error("invalid argument").into();
        assert!(matches!(err, DriverError::UnexpectedForm(_)));
    }

    #[test]
    fn wait_timeouts_are_transient() {
        let err: DriverError = WebDriverError::Timeout {
            waited: Duration::from_secs(1),
            target: "Css(\"div\")".to_string(),
        }
        .into();
        assert!(matches!(err, DriverError::Transient(_)));
    }
}
