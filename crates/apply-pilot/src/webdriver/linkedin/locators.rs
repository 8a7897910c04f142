use crate::webdriver::Locator;

pub(super) const LOGIN_URL: &str = "https://www.linkedin.com/login";
pub(super) const SEARCH_URL: &str = "https://www.linkedin.com/jobs/search/";
pub(super) const JOB_VIEW_URL: &str = "https://www.linkedin.com/jobs/view/";

pub(super) const LOGIN_USERNAME: Locator<'static> = Locator::Css("#username");
pub(super) const LOGIN_PASSWORD: Locator<'static> = Locator::Css("#password");
pub(super) const LOGIN_BUTTON: Locator<'static> = Locator::Css("button[type='submit']");
pub(super) const LOGIN_ERROR: Locator<'static> =
    Locator::Css("#error-for-username, #error-for-password");

pub(super) const SEARCH_RESULTS: Locator<'static> = Locator::Css(".jobs-search-results-list");
pub(super) const JOB_CARDS: Locator<'static> = Locator::Css("[data-job-id]");
pub(super) const EASY_APPLY_BUTTON: Locator<'static> =
    Locator::XPath("//button[contains(@class, 'jobs-apply-button')]");
pub(super) const APPLY_MODAL: Locator<'static> = Locator::Css(".jobs-easy-apply-modal");

pub(super) const FORM_SECTIONS: Locator<'static> =
    Locator::Css(".jobs-easy-apply-form-section__grouping");
pub(super) const RADIO_INPUTS: Locator<'static> = Locator::Css("input[type='radio']");
pub(super) const SELECT: Locator<'static> = Locator::Tag("select");
pub(super) const SELECT_OPTIONS: Locator<'static> = Locator::Tag("option");
pub(super) const TYPEAHEAD: Locator<'static> =
    Locator::XPath(".//*[contains(@id, 'text-entity-list-form-component')]");
pub(super) const TEXT_INPUTS: Locator<'static> =
    Locator::Css("input.artdeco-text-input--input, input[type='text'], textarea");
pub(super) const CHECKBOXES: Locator<'static> = Locator::Css("input[type='checkbox']");
pub(super) const FILE_INPUTS: Locator<'static> = Locator::Css("input[type='file']");

pub(super) const NEXT_BUTTON: Locator<'static> =
    Locator::Css("button[aria-label='Continue to next step']");
pub(super) const REVIEW_BUTTON: Locator<'static> =
    Locator::Css("button[aria-label='Review your application']");
pub(super) const SUBMIT_BUTTON: Locator<'static> =
    Locator::Css("button[aria-label='Submit application']");
pub(super) const INLINE_ERROR: Locator<'static> = Locator::Css(".artdeco-inline-feedback__message");

pub(super) const UPLOAD_RESUME: Locator<'static> =
    Locator::XPath("//*[contains(@id, 'jobs-document-upload-file-input-upload-resume')]");
pub(super) const UPLOAD_COVER_LETTER: Locator<'static> =
    Locator::XPath("//*[contains(@id, 'jobs-document-upload-file-input-upload-cover-letter')]");

pub(super) const DISMISS_BUTTON: Locator<'static> = Locator::Css("button[aria-label='Dismiss']");
pub(super) const DISCARD_BUTTON: Locator<'static> =
    Locator::Css("button[data-control-name='discard_application_confirm_btn']");
