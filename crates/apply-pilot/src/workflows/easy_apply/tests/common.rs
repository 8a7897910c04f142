use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::workflows::easy_apply::answers::QuestionAnswerCache;
use crate::workflows::easy_apply::domain::{
    ExperienceLevel, FilledAnswer, FormProgress, FormQuestion, Posting, PostingId, QuestionKind,
};
use crate::workflows::easy_apply::driver::{
    DriverError, RetryPolicy, SearchPage, SearchQuery, SessionDriver,
};
use crate::workflows::easy_apply::eligibility::{Blacklist, EligibilityFilter, ExperienceBounds};
use crate::workflows::easy_apply::filler::{
    FillerConfig, FormFiller, OperatorPrompt, PromptError, UnknownQuestionPolicy,
};
use crate::workflows::easy_apply::ledger::ApplicationLedger;
use crate::workflows::easy_apply::pacing::NoDelay;

pub(super) fn posting(id: &str, organization: &str, experience: Option<ExperienceLevel>) -> Posting {
    Posting {
        id: PostingId::new(id),
        organization: organization.to_string(),
        experience,
        title: format!("Software Engineer ({id})"),
        applied_on_site: false,
    }
}

pub(super) fn text_question(field_id: &str, label: &str) -> FormQuestion {
    FormQuestion {
        field_id: field_id.to_string(),
        label: label.to_string(),
        kind: QuestionKind::Text,
        required: true,
    }
}

pub(super) fn choice_question(field_id: &str, label: &str, options: &[&str]) -> FormQuestion {
    FormQuestion {
        field_id: field_id.to_string(),
        label: label.to_string(),
        kind: QuestionKind::SingleChoice {
            options: options.iter().map(|option| option.to_string()).collect(),
        },
        required: true,
    }
}

pub(super) fn scenario_filter() -> EligibilityFilter {
    EligibilityFilter::new(
        Blacklist::organizations(["Acme"]),
        ExperienceBounds::between(ExperienceLevel::Mid, ExperienceLevel::Senior),
    )
}

pub(super) fn filler_config() -> FillerConfig {
    FillerConfig {
        keywords: vec!["Rust Engineer".to_string()],
        locations: vec!["Remote".to_string()],
        pages_per_search: 3,
        max_applications: 10,
        max_form_steps: 4,
        unknown_question: UnknownQuestionPolicy::Abandon,
        default_answer: None,
        retry: RetryPolicy::immediate(2),
    }
}

pub(super) fn build_filler(
    driver: Arc<ScriptedDriver>,
    config: FillerConfig,
) -> FormFiller<ScriptedDriver> {
    FormFiller::new(driver, Arc::new(NoDelay), scenario_filter(), config)
        .with_ledger(ApplicationLedger::in_memory())
        .with_answers(QuestionAnswerCache::in_memory())
}

/// In-memory driver serving canned search pages and multi-step forms. Pages that were not
/// scripted report the end of the results.
#[derive(Default)]
pub(super) struct ScriptedDriver {
    pages: HashMap<u32, Vec<Posting>>,
    forms: HashMap<PostingId, Vec<Vec<FormQuestion>>>,
    auth_error: Option<DriverError>,
    open_errors: Mutex<HashMap<PostingId, VecDeque<DriverError>>>,
    submit_errors: HashMap<PostingId, DriverError>,
    current_step: Mutex<HashMap<PostingId, usize>>,
    pub(super) searches: Mutex<Vec<SearchQuery>>,
    pub(super) opened: Mutex<Vec<PostingId>>,
    pub(super) submitted: Mutex<Vec<(PostingId, Vec<FilledAnswer>)>>,
    pub(super) dismissed: Mutex<Vec<PostingId>>,
    pub(super) closed: AtomicBool,
}

impl ScriptedDriver {
    pub(super) fn with_page(mut self, page: u32, postings: Vec<Posting>) -> Self {
        self.pages.insert(page, postings);
        self
    }

    pub(super) fn with_form(mut self, id: &str, steps: Vec<Vec<FormQuestion>>) -> Self {
        self.forms.insert(PostingId::new(id), steps);
        self
    }

    pub(super) fn with_auth_error(mut self, error: DriverError) -> Self {
        self.auth_error = Some(error);
        self
    }

    pub(super) fn with_open_errors(self, id: &str, errors: Vec<DriverError>) -> Self {
        self.open_errors
            .lock()
            .expect("driver mutex poisoned")
            .insert(PostingId::new(id), errors.into());
        self
    }

    pub(super) fn with_submit_error(mut self, id: &str, error: DriverError) -> Self {
        self.submit_errors.insert(PostingId::new(id), error);
        self
    }

    pub(super) fn opened(&self) -> Vec<PostingId> {
        self.opened.lock().expect("driver mutex poisoned").clone()
    }

    pub(super) fn submitted(&self) -> Vec<(PostingId, Vec<FilledAnswer>)> {
        self.submitted.lock().expect("driver mutex poisoned").clone()
    }

    pub(super) fn dismissed(&self) -> Vec<PostingId> {
        self.dismissed.lock().expect("driver mutex poisoned").clone()
    }

    pub(super) fn search_count(&self) -> usize {
        self.searches.lock().expect("driver mutex poisoned").len()
    }
}

#[async_trait]
impl SessionDriver for ScriptedDriver {
    async fn authenticate(&self) -> Result<(), DriverError> {
        match &self.auth_error {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, DriverError> {
        self.searches
            .lock()
            .expect("driver mutex poisoned")
            .push(query.clone());
        Ok(match self.pages.get(&query.page) {
            Some(postings) => SearchPage::new(postings.clone()),
            None => SearchPage::end(),
        })
    }

    async fn open_application(&self, posting: &Posting) -> Result<Vec<FormQuestion>, DriverError> {
        self.opened
            .lock()
            .expect("driver mutex poisoned")
            .push(posting.id.clone());

        if let Some(queue) = self
            .open_errors
            .lock()
            .expect("driver mutex poisoned")
            .get_mut(&posting.id)
        {
            if let Some(error) = queue.pop_front() {
                return Err(error);
            }
        }

        self.current_step
            .lock()
            .expect("driver mutex poisoned")
            .insert(posting.id.clone(), 0);
        Ok(self
            .forms
            .get(&posting.id)
            .and_then(|steps| steps.first().cloned())
            .unwrap_or_default())
    }

    async fn submit_step(
        &self,
        posting: &Posting,
        answers: &[FilledAnswer],
    ) -> Result<FormProgress, DriverError> {
        if let Some(error) = self.submit_errors.get(&posting.id) {
            return Err(error.clone());
        }

        self.submitted
            .lock()
            .expect("driver mutex poisoned")
            .push((posting.id.clone(), answers.to_vec()));

        let mut steps = self.current_step.lock().expect("driver mutex poisoned");
        let step = steps.entry(posting.id.clone()).or_insert(0);
        *step += 1;

        match self.forms.get(&posting.id).and_then(|form| form.get(*step)) {
            Some(next) => Ok(FormProgress::NextStep(next.clone())),
            None => Ok(FormProgress::Submitted),
        }
    }

    async fn dismiss(&self, posting: &Posting) -> Result<(), DriverError> {
        self.dismissed
            .lock()
            .expect("driver mutex poisoned")
            .push(posting.id.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

/// Prompt returning canned replies and counting how often it was consulted.
#[derive(Default, Clone)]
pub(super) struct ScriptedPrompt {
    replies: Arc<Mutex<VecDeque<Option<String>>>>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedPrompt {
    pub(super) fn replying(replies: Vec<Option<&str>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                replies
                    .into_iter()
                    .map(|reply| reply.map(str::to_string))
                    .collect(),
            )),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OperatorPrompt for ScriptedPrompt {
    async fn ask(&self, _question: &FormQuestion) -> Result<Option<String>, PromptError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .replies
            .lock()
            .expect("prompt mutex poisoned")
            .pop_front()
            .flatten())
    }
}
