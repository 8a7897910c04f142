use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::domain::{ExperienceLevel, FilledAnswer, FormProgress, FormQuestion, Posting};

/// One page of search results to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub keywords: String,
    pub location: String,
    pub experience: Vec<ExperienceLevel>,
    /// Zero-based result page.
    pub page: u32,
}

/// Postings read from one result page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPage {
    pub postings: Vec<Posting>,
    /// The site showed no result cards; later pages of the same search are not fetched.
    pub exhausted: bool,
}

impl SearchPage {
    pub fn new(postings: Vec<Posting>) -> Self {
        Self {
            postings,
            exhausted: false,
        }
    }

    pub fn end() -> Self {
        Self {
            postings: Vec::new(),
            exhausted: true,
        }
    }
}

/// Capabilities the form filler needs from a live browser session.
#[async_trait]
pub trait SessionDriver: Send + Sync {
    async fn authenticate(&self) -> Result<(), DriverError>;

    /// Postings on one result page, in site order, including cards the site marks as applied.
    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, DriverError>;

    /// Opens the application form and returns the questions on its first step.
    async fn open_application(&self, posting: &Posting) -> Result<Vec<FormQuestion>, DriverError>;

    /// Fills the current step and advances it.
    async fn submit_step(
        &self,
        posting: &Posting,
        answers: &[FilledAnswer],
    ) -> Result<FormProgress, DriverError>;

    /// Best-effort cleanup of a half-filled form.
    async fn dismiss(&self, _posting: &Posting) -> Result<(), DriverError> {
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriverError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("transient interaction failure: {0}")]
    Transient(String),
    #[error("posting does not offer an easy-apply flow")]
    NotEasyApply,
    #[error("application rejected: {0}")]
    Rejected(String),
    #[error("unexpected form state: {0}")]
    UnexpectedForm(String),
    #[error("browser session lost: {0}")]
    SessionLost(String),
}

impl DriverError {
    pub fn is_transient(&self) -> bool {
        matches!(self, DriverError::Transient(_))
    }

    /// Errors after which no further posting can be processed.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            DriverError::Authentication(_) | DriverError::SessionLost(_)
        )
    }
}

/// Bounded exponential backoff for transient driver failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 500,
        }
    }
}

impl RetryPolicy {
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 0,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.base_delay_ms.saturating_mul(factor))
    }
}

/// Runs `op` until it succeeds, fails non-transiently, or exhausts the policy.
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    action: &str,
    mut op: F,
) -> Result<T, DriverError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, DriverError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Err(err) if err.is_transient() && attempt < attempts => {
                let delay = policy.backoff(attempt);
                warn!(action, attempt, ?delay, error = %err, "retrying after transient failure");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            other => return other,
        }
    }
}
