use serde::{Deserialize, Serialize};

use super::super::driver::RetryPolicy;

/// What to do with a required question that neither the cache nor a rule can answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownQuestionPolicy {
    /// Give up on the posting.
    #[default]
    Abandon,
    /// Use the configured default answer and remember it.
    Default,
    /// Ask the operator and remember the reply.
    Prompt,
}

/// Run-loop settings for the form filler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerConfig {
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
    pub pages_per_search: u32,
    pub max_applications: u32,
    pub max_form_steps: u32,
    pub unknown_question: UnknownQuestionPolicy,
    pub default_answer: Option<String>,
    pub retry: RetryPolicy,
}

impl Default for FillerConfig {
    fn default() -> Self {
        Self {
            keywords: Vec::new(),
            locations: Vec::new(),
            pages_per_search: 4,
            max_applications: 10,
            max_form_steps: 8,
            unknown_question: UnknownQuestionPolicy::Abandon,
            default_answer: None,
            retry: RetryPolicy::default(),
        }
    }
}
