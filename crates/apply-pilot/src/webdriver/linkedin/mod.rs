mod locators;
mod page;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub use page::search_url;

use self::locators::*;
use self::page::{
    clean_label, is_job_id, is_placeholder_option, login_state, marks_required, parse_card,
    LoginState,
};
use super::client::ENTER_KEY;
use super::{ElementRef, Locator, WebDriverClient, WebDriverError};
use crate::config::{ConfigError, Credentials, RunConfig};
use crate::workflows::easy_apply::{
    normalize_text, DriverError, FilledAnswer, FormProgress, FormQuestion, NoDelay, Pacer,
    Posting, QuestionKind, SearchPage, SearchQuery, SessionDriver,
};

const SCROLL_STEP: u32 = 300;
const SCROLL_LIMIT: u32 = 3000;
const SCROLL_PAUSE: Duration = Duration::from_millis(250);
const LOGIN_POLL: Duration = Duration::from_millis(500);

/// Site-level settings for the LinkedIn driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedInSettings {
    pub wait_timeout: Duration,
    pub resume: Option<PathBuf>,
    pub cover_letter: Option<PathBuf>,
}

impl LinkedInSettings {
    /// Upload paths are resolved to absolute paths; a missing file is a configuration error.
    pub fn from_config(config: &RunConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            wait_timeout: Duration::from_secs(config.webdriver.wait_timeout_secs.max(1)),
            resume: resolve_upload(config.uploads.resume.as_deref())?,
            cover_letter: resolve_upload(config.uploads.cover_letter.as_deref())?,
        })
    }
}

fn resolve_upload(path: Option<&Path>) -> Result<Option<PathBuf>, ConfigError> {
    path.map(|path| {
        path.canonicalize().map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })
    })
    .transpose()
}

/// Form widget found inside one question section.
enum Widget {
    Radio(Vec<ElementRef>),
    Select(ElementRef),
    Typeahead(ElementRef),
    Text(ElementRef),
    Upload,
    Checkbox,
    Unknown,
}

/// [`SessionDriver`] for LinkedIn's Easy Apply flow.
pub struct LinkedInDriver {
    client: WebDriverClient,
    credentials: Credentials,
    settings: LinkedInSettings,
    pacer: Arc<dyn Pacer>,
}

impl LinkedInDriver {
    pub fn new(client: WebDriverClient, credentials: Credentials, settings: LinkedInSettings) -> Self {
        Self {
            client,
            credentials,
            settings,
            pacer: Arc::new(NoDelay),
        }
    }

    /// Pacer used between keystrokes, clicks, and page loads.
    pub fn with_pacer(mut self, pacer: Arc<dyn Pacer>) -> Self {
        self.pacer = pacer;
        self
    }

    async fn first(&self, locator: Locator<'_>) -> Result<Option<ElementRef>, WebDriverError> {
        Ok(self.client.find_all(locator).await?.into_iter().next())
    }

    async fn first_within(
        &self,
        parent: &ElementRef,
        locator: Locator<'_>,
    ) -> Result<Option<ElementRef>, WebDriverError> {
        Ok(self
            .client
            .find_within(parent, locator)
            .await?
            .into_iter()
            .next())
    }

    async fn wait_first(&self, locator: Locator<'_>) -> Result<ElementRef, WebDriverError> {
        self.client
            .wait_for(locator, self.settings.wait_timeout)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| WebDriverError::Protocol(format!("{locator:?} matched nothing")))
    }

    async fn await_sign_in(&self) -> Result<(), DriverError> {
        let deadline = Instant::now() + self.settings.wait_timeout;
        loop {
            let url = self.client.current_url().await?;
            match login_state(&url) {
                LoginState::SignedIn => return Ok(()),
                LoginState::Challenged => {
                    return Err(DriverError::Authentication(
                        "security checkpoint requires manual verification".to_string(),
                    ))
                }
                LoginState::Pending => {}
            }

            if let Some(feedback) = self.first(LOGIN_ERROR).await? {
                let message = self.client.text(&feedback).await?;
                if !message.trim().is_empty() {
                    return Err(DriverError::Authentication(message.trim().to_string()));
                }
            }
            if Instant::now() >= deadline {
                return Err(DriverError::Authentication(
                    "still on the login page after submitting credentials".to_string(),
                ));
            }
            tokio::time::sleep(LOGIN_POLL).await;
        }
    }

    /// Scrolls the result list so lazily rendered cards load. Failures only cost cards.
    async fn scroll_results(&self) {
        let container = match self.first(SEARCH_RESULTS).await {
            Ok(container) => container,
            Err(err) => {
                debug!(error = %err, "result list lookup failed");
                None
            }
        };

        for offset in (SCROLL_STEP..=SCROLL_LIMIT).step_by(SCROLL_STEP as usize) {
            let scrolled = match &container {
                Some(list) => self.client.scroll_element(list, offset).await,
                None => self
                    .client
                    .execute("window.scrollTo(0, arguments[0]);", vec![offset.into()])
                    .await
                    .map(drop),
            };
            if let Err(err) = scrolled {
                debug!(error = %err, offset, "scrolling stopped early");
                return;
            }
            tokio::time::sleep(SCROLL_PAUSE).await;
        }
    }

    async fn easy_apply_button(&self) -> Result<Option<ElementRef>, WebDriverError> {
        let buttons = match self
            .client
            .wait_for(EASY_APPLY_BUTTON, self.settings.wait_timeout)
            .await
        {
            Ok(buttons) => buttons,
            Err(WebDriverError::Timeout { .. }) => return Ok(None),
            Err(err) => return Err(err),
        };

        for button in buttons {
            if self.client.text(&button).await?.contains("Easy Apply") {
                return Ok(Some(button));
            }
        }
        Ok(None)
    }

    async fn widget(&self, section: &ElementRef) -> Result<Widget, WebDriverError> {
        if self.first_within(section, FILE_INPUTS).await?.is_some() {
            return Ok(Widget::Upload);
        }
        let radios = self.client.find_within(section, RADIO_INPUTS).await?;
        if !radios.is_empty() {
            return Ok(Widget::Radio(radios));
        }
        if let Some(select) = self.first_within(section, SELECT).await? {
            return Ok(Widget::Select(select));
        }
        if let Some(input) = self.first_within(section, TYPEAHEAD).await? {
            return Ok(Widget::Typeahead(input));
        }
        if let Some(input) = self.first_within(section, TEXT_INPUTS).await? {
            return Ok(Widget::Text(input));
        }
        if self.first_within(section, CHECKBOXES).await?.is_some() {
            return Ok(Widget::Checkbox);
        }
        Ok(Widget::Unknown)
    }

    async fn declares_required(&self, input: &ElementRef) -> Result<bool, WebDriverError> {
        if self.client.attribute(input, "required").await?.is_some() {
            return Ok(true);
        }
        Ok(self
            .client
            .attribute(input, "aria-required")
            .await?
            .is_some_and(|value| value == "true"))
    }

    async fn select_options(&self, select: &ElementRef) -> Result<Vec<(ElementRef, String)>, WebDriverError> {
        let mut options = Vec::new();
        for option in self.client.find_within(select, SELECT_OPTIONS).await? {
            let text = self.client.text(&option).await?;
            if !is_placeholder_option(&text) {
                options.push((option, text.trim().to_string()));
            }
        }
        Ok(options)
    }

    async fn describe_section(&self, section: ElementRef) -> Result<Option<FormQuestion>, WebDriverError> {
        let text = self.client.text(&section).await?;
        let label = clean_label(&text);
        if label.is_empty() {
            return Ok(None);
        }

        let mut required = marks_required(&text);
        let kind = match self.widget(&section).await? {
            Widget::Upload => return Ok(None),
            Widget::Radio(inputs) => {
                let mut options = Vec::with_capacity(inputs.len());
                for input in &inputs {
                    if let Some(value) = self.client.attribute(input, "value").await? {
                        if !value.trim().is_empty() {
                            options.push(value.trim().to_string());
                        }
                    }
                }
                if let Some(input) = inputs.first() {
                    required |= self.declares_required(input).await?;
                }
                QuestionKind::SingleChoice { options }
            }
            Widget::Select(select) => {
                required |= self.declares_required(&select).await?;
                let options = self
                    .select_options(&select)
                    .await?
                    .into_iter()
                    .map(|(_, text)| text)
                    .collect();
                QuestionKind::SingleChoice { options }
            }
            Widget::Typeahead(input) => {
                required |= self.declares_required(&input).await?;
                QuestionKind::Typeahead
            }
            Widget::Text(input) => {
                required |= self.declares_required(&input).await?;
                let id = self.client.attribute(&input, "id").await?.unwrap_or_default();
                let input_type = self.client.attribute(&input, "type").await?.unwrap_or_default();
                if id.contains("numeric") || input_type == "number" {
                    QuestionKind::Numeric
                } else {
                    QuestionKind::Text
                }
            }
            Widget::Checkbox => QuestionKind::Unsupported {
                description: "checkbox".to_string(),
            },
            Widget::Unknown => QuestionKind::Unsupported {
                description: "unrecognized input".to_string(),
            },
        };

        Ok(Some(FormQuestion {
            field_id: section.id().to_string(),
            label,
            kind,
            required,
        }))
    }

    async fn read_step(&self) -> Result<Vec<FormQuestion>, WebDriverError> {
        let sections = self.client.find_all(FORM_SECTIONS).await?;
        let mut questions = Vec::with_capacity(sections.len());
        for section in sections {
            if let Some(question) = self.describe_section(section).await? {
                questions.push(question);
            }
        }
        debug!(questions = questions.len(), "read form step");
        Ok(questions)
    }

    async fn fill_section(&self, answer: &FilledAnswer) -> Result<(), DriverError> {
        let section = ElementRef::new(answer.field_id.clone());
        let wanted = normalize_text(&answer.value);

        match self.widget(&section).await? {
            Widget::Radio(inputs) => {
                for input in inputs {
                    let value = self.client.attribute(&input, "value").await?.unwrap_or_default();
                    if normalize_text(&value) == wanted {
                        self.client.script_click(&input).await?;
                        return Ok(());
                    }
                }
                Err(DriverError::UnexpectedForm(format!(
                    "no radio option '{}'",
                    answer.value
                )))
            }
            Widget::Select(select) => {
                for (option, text) in self.select_options(&select).await? {
                    if normalize_text(&text) == wanted {
                        self.client.click(&option).await?;
                        return Ok(());
                    }
                }
                Err(DriverError::UnexpectedForm(format!(
                    "no select option '{}'",
                    answer.value
                )))
            }
            Widget::Typeahead(input) => {
                self.client.clear(&input).await?;
                self.client.send_keys(&input, &answer.value).await?;
                self.pacer.pause().await;
                self.client.send_keys(&input, ENTER_KEY).await?;
                Ok(())
            }
            Widget::Text(input) => {
                self.client.clear(&input).await?;
                self.client.send_keys(&input, &answer.value).await?;
                Ok(())
            }
            Widget::Upload | Widget::Checkbox | Widget::Unknown => Err(
                DriverError::UnexpectedForm(format!("field {} cannot take text", answer.field_id)),
            ),
        }
    }

    async fn attach_uploads(&self) -> Result<(), WebDriverError> {
        let uploads = [
            (UPLOAD_RESUME, self.settings.resume.as_deref()),
            (UPLOAD_COVER_LETTER, self.settings.cover_letter.as_deref()),
        ];
        for (locator, path) in uploads {
            let Some(path) = path else { continue };
            if let Some(input) = self.first(locator).await? {
                debug!(file = %path.display(), "attaching document");
                self.client
                    .send_keys(&input, &path.display().to_string())
                    .await?;
            }
        }
        Ok(())
    }

    async fn inline_error(&self) -> Result<Option<String>, WebDriverError> {
        for feedback in self.client.find_all(INLINE_ERROR).await? {
            let message = self.client.text(&feedback).await?;
            if !message.trim().is_empty() {
                return Ok(Some(message.trim().to_string()));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl SessionDriver for LinkedInDriver {
    async fn authenticate(&self) -> Result<(), DriverError> {
        self.client.navigate(LOGIN_URL).await?;

        let username = self.wait_first(LOGIN_USERNAME).await?;
        self.client.clear(&username).await?;
        self.client
            .send_keys(&username, &self.credentials.username)
            .await?;
        self.pacer.pause().await;

        let password = self.wait_first(LOGIN_PASSWORD).await?;
        self.client
            .send_keys(&password, &self.credentials.password)
            .await?;
        self.pacer.pause().await;

        let submit = self.wait_first(LOGIN_BUTTON).await?;
        self.client.click(&submit).await?;

        self.await_sign_in().await?;
        info!("signed in");
        Ok(())
    }

    async fn search(&self, query: &SearchQuery) -> Result<SearchPage, DriverError> {
        let url = search_url(query)?;
        self.client.navigate(url.as_str()).await?;
        self.pacer.pause().await;

        match self.client.wait_for(JOB_CARDS, self.settings.wait_timeout).await {
            Ok(_) => {}
            Err(WebDriverError::Timeout { .. }) => {
                debug!(page = query.page, "no result cards on page");
                return Ok(SearchPage::end());
            }
            Err(err) => return Err(err.into()),
        }
        self.scroll_results().await;

        let cards = self.client.find_all(JOB_CARDS).await?;
        if cards.is_empty() {
            return Ok(SearchPage::end());
        }

        let mut postings: Vec<Posting> = Vec::new();
        for card in cards {
            let Some(id) = self.client.attribute(&card, "data-job-id").await? else {
                continue;
            };
            if !is_job_id(&id) || postings.iter().any(|posting| posting.id.as_str() == id) {
                continue;
            }
            let text = self.client.text(&card).await?;
            if let Some(posting) = parse_card(&id, &text) {
                if posting.applied_on_site {
                    debug!(posting = %id, "card already marked applied");
                }
                postings.push(posting);
            }
        }

        debug!(page = query.page, found = postings.len(), "parsed result cards");
        Ok(SearchPage::new(postings))
    }

    async fn open_application(&self, posting: &Posting) -> Result<Vec<FormQuestion>, DriverError> {
        self.client
            .navigate(&format!("{JOB_VIEW_URL}{}/", posting.id))
            .await?;
        self.pacer.pause().await;

        let button = self
            .easy_apply_button()
            .await?
            .ok_or(DriverError::NotEasyApply)?;
        self.client.click(&button).await?;
        self.client
            .wait_for(APPLY_MODAL, self.settings.wait_timeout)
            .await?;
        self.pacer.pause().await;

        Ok(self.read_step().await?)
    }

    async fn submit_step(
        &self,
        posting: &Posting,
        answers: &[FilledAnswer],
    ) -> Result<FormProgress, DriverError> {
        for answer in answers {
            self.fill_section(answer).await?;
        }
        self.attach_uploads().await?;

        if let Some(submit) = self.first(SUBMIT_BUTTON).await? {
            self.client.click(&submit).await?;
            self.pacer.pause().await;
            debug!(posting = %posting.id, "submit clicked");
            return Ok(FormProgress::Submitted);
        }

        let advance = match self.first(NEXT_BUTTON).await? {
            Some(button) => button,
            None => self.first(REVIEW_BUTTON).await?.ok_or_else(|| {
                DriverError::UnexpectedForm("no continue, review or submit button".to_string())
            })?,
        };
        self.client.click(&advance).await?;
        self.pacer.pause().await;

        if let Some(message) = self.inline_error().await? {
            return Err(DriverError::Rejected(message));
        }
        Ok(FormProgress::NextStep(self.read_step().await?))
    }

    async fn dismiss(&self, posting: &Posting) -> Result<(), DriverError> {
        if let Some(dismiss) = self.first(DISMISS_BUTTON).await? {
            self.client.click(&dismiss).await?;
            self.pacer.pause().await;
        }
        if let Some(discard) = self.first(DISCARD_BUTTON).await? {
            self.client.click(&discard).await?;
        }
        debug!(posting = %posting.id, "application dismissed");
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        if let Err(err) = self.client.quit().await {
            warn!(error = %err, "browser session did not close cleanly");
            return Err(err.into());
        }
        info!("browser session closed");
        Ok(())
    }
}
