//! Easy Apply workflow: eligibility filtering, the question-answer cache, the application
//! ledger, and the form filler that drives a [`SessionDriver`] through each posting.
//!
//! Everything in here is independent of any real browser. The WebDriver-backed driver lives in
//! [`crate::webdriver`]; tests use a scripted driver instead.

pub mod answers;
pub mod domain;
pub mod driver;
pub mod eligibility;
pub mod filler;
pub mod ledger;
pub(crate) mod normalizer;
pub mod pacing;

#[cfg(test)]
mod tests;

pub use answers::{AnswerProfile, AnswerRule, AnswerRules, AnswerStoreError, QuestionAnswerCache};
pub use domain::{
    ExperienceLevel, FilledAnswer, FormProgress, FormQuestion, Outcome, Posting, PostingId,
    QuestionKind,
};
pub use driver::{DriverError, RetryPolicy, SearchPage, SearchQuery, SessionDriver};
pub use eligibility::{evaluate, Blacklist, BlacklistHit, Decision, EligibilityFilter, ExperienceBounds};
pub use filler::{
    FillerConfig, FillerError, FormFiller, OperatorPrompt, PostingReport, PostingState,
    PromptError, RunSummary, StopReason, StopSignal, UnknownQuestionPolicy,
};
pub use ledger::{ApplicationLedger, LedgerEntry, LedgerError};
pub use normalizer::normalize_text;
pub use pacing::{NoDelay, Pacer, RandomPacer};
