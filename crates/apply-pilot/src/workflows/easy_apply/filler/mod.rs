mod answering;
mod config;
mod report;
mod stop;

pub use answering::{OperatorPrompt, PromptError};
pub use config::{FillerConfig, UnknownQuestionPolicy};
pub use report::{PostingReport, PostingState, RunSummary, StopReason};
pub use stop::StopSignal;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::answers::{AnswerRules, AnswerStoreError, QuestionAnswerCache};
use super::domain::{
    FilledAnswer, FormProgress, FormQuestion, Outcome, Posting, PostingId, QuestionKind,
};
use super::driver::{retry_transient, DriverError, SearchPage, SearchQuery, SessionDriver};
use super::eligibility::EligibilityFilter;
use super::ledger::{ApplicationLedger, LedgerEntry, LedgerError};
use super::pacing::Pacer;
use answering::{conform, AnswerSource, Resolution, StepAnswers};

/// Drives one run: search, filter, answer, submit, and record every outcome.
pub struct FormFiller<D> {
    driver: Arc<D>,
    pacer: Arc<dyn Pacer>,
    eligibility: EligibilityFilter,
    ledger: ApplicationLedger,
    answers: QuestionAnswerCache,
    rules: AnswerRules,
    prompt: Option<Box<dyn OperatorPrompt>>,
    stop: StopSignal,
    config: FillerConfig,
}

/// Result of one pass through the application form.
enum Attempt {
    Submitted { steps: u32 },
    Failed {
        reason: String,
        cause: Option<DriverError>,
    },
}

impl Attempt {
    fn from_driver(err: DriverError) -> Self {
        Attempt::Failed {
            reason: err.to_string(),
            cause: Some(err),
        }
    }
}

#[derive(Default)]
struct RunProgress {
    applied: u32,
    searches: u32,
    browser_used: bool,
    seen: HashSet<PostingId>,
    reports: Vec<PostingReport>,
}

impl RunProgress {
    fn finish(self, stop_reason: StopReason) -> RunSummary {
        RunSummary {
            stop_reason,
            searches: self.searches,
            postings: self.reports,
        }
    }
}

impl<D> FormFiller<D>
where
    D: SessionDriver + 'static,
{
    pub fn new(
        driver: Arc<D>,
        pacer: Arc<dyn Pacer>,
        eligibility: EligibilityFilter,
        config: FillerConfig,
    ) -> Self {
        Self {
            driver,
            pacer,
            eligibility,
            ledger: ApplicationLedger::in_memory(),
            answers: QuestionAnswerCache::in_memory(),
            rules: AnswerRules::default(),
            prompt: None,
            stop: StopSignal::default(),
            config,
        }
    }

    pub fn with_ledger(mut self, ledger: ApplicationLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn with_answers(mut self, answers: QuestionAnswerCache) -> Self {
        self.answers = answers;
        self
    }

    pub fn with_rules(mut self, rules: AnswerRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn with_prompt(mut self, prompt: Box<dyn OperatorPrompt>) -> Self {
        self.prompt = Some(prompt);
        self
    }

    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    pub fn ledger(&self) -> &ApplicationLedger {
        &self.ledger
    }

    pub fn answers(&self) -> &QuestionAnswerCache {
        &self.answers
    }

    pub fn into_stores(self) -> (ApplicationLedger, QuestionAnswerCache) {
        (self.ledger, self.answers)
    }

    /// Authenticates, works through every configured search, then closes the session.
    /// The answer cache is flushed on the way out whether or not the run succeeded.
    pub async fn run(&mut self) -> Result<RunSummary, FillerError> {
        let outcome = self.drive().await;

        if let Err(err) = self.driver.close().await {
            warn!(error = %err, "failed to close browser session");
        }
        let flushed = self.answers.flush();

        let summary = outcome?;
        flushed?;

        info!(
            applied = summary.applied(),
            postings = summary.postings.len(),
            searches = summary.searches,
            reason = summary.stop_reason.label(),
            "run complete"
        );
        Ok(summary)
    }

    async fn drive(&mut self) -> Result<RunSummary, FillerError> {
        info!("authenticating");
        retry_transient(&self.config.retry, "authenticate", || {
            self.driver.authenticate()
        })
        .await
        .map_err(|err| match err {
            DriverError::Authentication(_) => err,
            other => DriverError::Authentication(other.to_string()),
        })?;

        let mut progress = RunProgress::default();
        let experience = self.eligibility.bounds().levels();
        let searches: Vec<(String, String)> = self
            .config
            .keywords
            .iter()
            .flat_map(|keywords| {
                self.config
                    .locations
                    .iter()
                    .map(move |location| (keywords.clone(), location.clone()))
            })
            .collect();

        for (keywords, location) in searches {
            for page in 0..self.config.pages_per_search {
                if let Some(reason) = self.stop_reason(&progress) {
                    return Ok(progress.finish(reason));
                }

                let query = SearchQuery {
                    keywords: keywords.clone(),
                    location: location.clone(),
                    experience: experience.clone(),
                    page,
                };
                progress.searches += 1;
                info!(keywords = %query.keywords, location = %query.location, page, "searching");

                let results = match retry_transient(&self.config.retry, "search", || {
                    self.driver.search(&query)
                })
                .await
                {
                    Ok(results) => results,
                    Err(err) if err.is_fatal() => return Err(err.into()),
                    Err(err) => {
                        warn!(error = %err, page, "search page failed, moving on");
                        SearchPage::default()
                    }
                };

                if results.exhausted {
                    debug!(page, "no more results");
                    break;
                }

                for posting in results.postings {
                    if let Some(reason) = self.stop_reason(&progress) {
                        return Ok(progress.finish(reason));
                    }
                    if !progress.seen.insert(posting.id.clone()) {
                        debug!(posting_id = %posting.id, "posting already handled this run");
                        continue;
                    }

                    let report = self.process_posting(posting, &mut progress).await?;
                    progress.reports.push(report);
                }
            }
        }

        Ok(progress.finish(StopReason::Exhausted))
    }

    fn stop_reason(&self, progress: &RunProgress) -> Option<StopReason> {
        if self.stop.is_requested() {
            Some(StopReason::StopRequested)
        } else if progress.applied >= self.config.max_applications {
            Some(StopReason::LimitReached)
        } else {
            None
        }
    }

    async fn process_posting(
        &mut self,
        posting: Posting,
        progress: &mut RunProgress,
    ) -> Result<PostingReport, FillerError> {
        let mut trail = vec![PostingState::Discovered];

        let decision = self.eligibility.evaluate(&posting, &self.ledger);
        trail.push(PostingState::Evaluated(decision.clone()));

        if let Some(outcome) = decision.skip_outcome() {
            let detail = decision.summary();
            info!(
                posting_id = %posting.id,
                organization = %posting.organization,
                outcome = outcome.label(),
                %detail,
                "skipping posting"
            );
            self.ledger
                .append(LedgerEntry::for_posting(&posting, outcome, detail))?;
            trail.push(PostingState::Skipped(outcome));
            return Ok(PostingReport {
                posting_id: posting.id,
                outcome,
                trail,
            });
        }

        if progress.browser_used {
            self.pacer.pause().await;
        }
        progress.browser_used = true;

        info!(
            posting_id = %posting.id,
            organization = %posting.organization,
            title = %posting.title,
            "applying"
        );
        trail.push(PostingState::Answering);

        match self.attempt(&posting).await? {
            Attempt::Submitted { steps } => {
                info!(posting_id = %posting.id, steps, "application submitted");
                self.ledger.append(LedgerEntry::for_posting(
                    &posting,
                    Outcome::Applied,
                    format!("submitted after {steps} step(s)"),
                ))?;
                progress.applied += 1;
                trail.push(PostingState::Applied);
                Ok(PostingReport {
                    posting_id: posting.id,
                    outcome: Outcome::Applied,
                    trail,
                })
            }
            Attempt::Failed { reason, cause } => {
                warn!(posting_id = %posting.id, %reason, "application failed");
                if let Err(err) = self.driver.dismiss(&posting).await {
                    debug!(error = %err, "could not dismiss application form");
                }
                self.ledger.append(LedgerEntry::for_posting(
                    &posting,
                    Outcome::Failed,
                    reason.clone(),
                ))?;

                if let Some(err) = cause.filter(DriverError::is_fatal) {
                    return Err(err.into());
                }

                trail.push(PostingState::Failed(reason));
                Ok(PostingReport {
                    posting_id: posting.id,
                    outcome: Outcome::Failed,
                    trail,
                })
            }
        }
    }

    async fn attempt(&mut self, posting: &Posting) -> Result<Attempt, FillerError> {
        let opened = retry_transient(&self.config.retry, "open application", || {
            self.driver.open_application(posting)
        })
        .await;
        let mut questions = match opened {
            Ok(questions) => questions,
            Err(err) => return Ok(Attempt::from_driver(err)),
        };

        for step in 1..=self.config.max_form_steps {
            let (answers, learned) = match self.answer_step(&questions).await {
                StepAnswers::Ready { filled, learned } => (filled, learned),
                StepAnswers::Abandon(reason) => {
                    return Ok(Attempt::Failed {
                        reason,
                        cause: None,
                    })
                }
            };

            let progress = match self.driver.submit_step(posting, &answers).await {
                Ok(progress) => progress,
                Err(err) => return Ok(Attempt::from_driver(err)),
            };
            for (question, answer) in &learned {
                self.answers.record(question, answer)?;
            }

            match progress {
                FormProgress::Submitted => return Ok(Attempt::Submitted { steps: step }),
                FormProgress::NextStep(next) => questions = next,
            }
        }

        Ok(Attempt::Failed {
            reason: format!(
                "form did not complete within {} steps",
                self.config.max_form_steps
            ),
            cause: None,
        })
    }

    /// Resolves every question on a step; nothing is cached unless the whole step is answerable.
    async fn answer_step(&self, questions: &[FormQuestion]) -> StepAnswers {
        let unsupported = questions.iter().find_map(|question| match &question.kind {
            QuestionKind::Unsupported { description } => Some(format!(
                "unsupported question '{}' ({description})",
                question.label
            )),
            _ => None,
        });
        if let Some(reason) = unsupported {
            return StepAnswers::Abandon(reason);
        }

        let mut filled = Vec::with_capacity(questions.len());
        let mut learned = Vec::new();

        for question in questions {
            let (answer, source) = match self.resolve(question).await {
                Resolution::Answer { value, source } => (value, source),
                Resolution::Blank => continue,
                Resolution::Abandon(reason) => return StepAnswers::Abandon(reason),
            };

            let value = match conform(question, &answer) {
                Ok(value) => value,
                Err(reason) => return StepAnswers::Abandon(reason),
            };

            debug!(question = %question.label, source = source.label(), "answered");
            if source.should_record() {
                learned.push((question.label.clone(), value.clone()));
            }

            filled.push(FilledAnswer {
                field_id: question.field_id.clone(),
                value,
            });
        }

        StepAnswers::Ready { filled, learned }
    }

    async fn resolve(&self, question: &FormQuestion) -> Resolution {
        if let Some(answer) = self.answers.lookup(&question.label) {
            return Resolution::Answer {
                value: answer.to_string(),
                source: AnswerSource::Cache,
            };
        }
        if let Some(answer) = self.rules.answer_for(&question.label) {
            return Resolution::Answer {
                value: answer.to_string(),
                source: AnswerSource::Rule,
            };
        }
        if !question.required {
            return Resolution::Blank;
        }

        match self.config.unknown_question {
            UnknownQuestionPolicy::Abandon => Resolution::Abandon(format!(
                "no known answer for required question '{}'",
                question.label
            )),
            UnknownQuestionPolicy::Default => match &self.config.default_answer {
                Some(answer) => Resolution::Answer {
                    value: answer.clone(),
                    source: AnswerSource::Default,
                },
                None => Resolution::Abandon(format!(
                    "no default answer configured for '{}'",
                    question.label
                )),
            },
            UnknownQuestionPolicy::Prompt => {
                let Some(prompt) = &self.prompt else {
                    return Resolution::Abandon(format!(
                        "no operator available to answer '{}'",
                        question.label
                    ));
                };
                match prompt.ask(question).await {
                    Ok(Some(answer)) if !answer.trim().is_empty() => Resolution::Answer {
                        value: answer,
                        source: AnswerSource::Operator,
                    },
                    Ok(_) => Resolution::Abandon(format!(
                        "operator declined to answer '{}'",
                        question.label
                    )),
                    Err(err) => Resolution::Abandon(err.to_string()),
                }
            }
        }
    }
}

/// Error that ends a run early.
#[derive(Debug, thiserror::Error)]
pub enum FillerError {
    #[error(transparent)]
    Driver(#[from] DriverError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Answers(#[from] AnswerStoreError),
}
