use async_trait::async_trait;

use super::super::domain::{FilledAnswer, FormQuestion, QuestionKind};
use super::super::normalizer::normalize_text;

/// Interactive fallback for questions nothing else can answer.
#[async_trait]
pub trait OperatorPrompt: Send + Sync {
    /// `Ok(None)` means the operator declined to answer.
    async fn ask(&self, question: &FormQuestion) -> Result<Option<String>, PromptError>;
}

#[derive(Debug, thiserror::Error)]
#[error("operator prompt failed: {0}")]
pub struct PromptError(pub String);

/// Where an answer came from; only fresh answers are written back to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AnswerSource {
    Cache,
    Rule,
    Default,
    Operator,
}

impl AnswerSource {
    pub(crate) const fn label(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Rule => "rule",
            Self::Default => "default",
            Self::Operator => "operator",
        }
    }

    pub(crate) const fn should_record(self) -> bool {
        matches!(self, Self::Default | Self::Operator)
    }
}

pub(crate) enum Resolution {
    Answer { value: String, source: AnswerSource },
    /// Optional question with no known answer; left blank.
    Blank,
    Abandon(String),
}

pub(crate) enum StepAnswers {
    Ready {
        filled: Vec<FilledAnswer>,
        /// Fresh `(question, answer)` pairs, cached once the driver accepts the step.
        learned: Vec<(String, String)>,
    },
    Abandon(String),
}

/// Checks an answer against the widget and returns the value to type or select.
pub(crate) fn conform(question: &FormQuestion, answer: &str) -> Result<String, String> {
    let trimmed = answer.trim();
    if trimmed.is_empty() {
        return Err(format!("empty answer for '{}'", question.label));
    }

    match &question.kind {
        QuestionKind::SingleChoice { options } => {
            let wanted = normalize_text(trimmed);
            options
                .iter()
                .find(|option| normalize_text(option) == wanted)
                .cloned()
                .ok_or_else(|| {
                    format!(
                        "answer '{trimmed}' is not one of the options for '{}'",
                        question.label
                    )
                })
        }
        QuestionKind::Numeric => trimmed
            .split_whitespace()
            .map(|token| token.replace(',', ""))
            .find(|token| token.parse::<f64>().is_ok())
            .ok_or_else(|| {
                format!(
                    "answer '{trimmed}' is not numeric for '{}'",
                    question.label
                )
            }),
        QuestionKind::Unsupported { description } => Err(format!(
            "unsupported question '{}' ({description})",
            question.label
        )),
        QuestionKind::Text | QuestionKind::Typeahead => Ok(trimmed.to_string()),
    }
}
