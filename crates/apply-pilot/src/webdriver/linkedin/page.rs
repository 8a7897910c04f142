use std::collections::BTreeSet;

use reqwest::Url;

use super::locators::SEARCH_URL;
use crate::webdriver::WebDriverError;
use crate::workflows::easy_apply::{ExperienceLevel, Posting, PostingId, SearchQuery};

pub(super) const RESULTS_PER_PAGE: u32 = 25;

/// Distinct filter codes the site recognizes.
const FILTER_CODES: usize = 6;

const SELECT_PLACEHOLDER: &str = "select an option";

/// Search results URL for one page of a query, restricted to Easy Apply postings.
pub fn search_url(query: &SearchQuery) -> Result<Url, WebDriverError> {
    let mut url =
        Url::parse(SEARCH_URL).map_err(|err| WebDriverError::Protocol(err.to_string()))?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs
            .append_pair("f_AL", "true")
            .append_pair("keywords", query.keywords.trim())
            .append_pair("location", query.location.trim());
        if let Some(codes) = experience_filter(&query.experience) {
            pairs.append_pair("f_E", &codes);
        }
        if query.page > 0 {
            pairs.append_pair("start", &(query.page * RESULTS_PER_PAGE).to_string());
        }
    }
    Ok(url)
}

/// Comma-separated filter codes, or `None` when the levels do not narrow the search.
pub(super) fn experience_filter(levels: &[ExperienceLevel]) -> Option<String> {
    let codes: BTreeSet<u8> = levels.iter().map(|level| level.search_code()).collect();
    if codes.is_empty() || codes.len() >= FILTER_CODES {
        return None;
    }
    Some(
        codes
            .iter()
            .map(u8::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

pub(super) fn is_job_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

fn card_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().map(str::trim).filter(|line| !line.is_empty())
}

/// Cards the account already applied to carry an "Applied" or "Applied 3 days ago" footer.
pub(super) fn already_applied(card_text: &str) -> bool {
    card_lines(card_text)
        .any(|line| line == "Applied" || (line.starts_with("Applied ") && line.ends_with(" ago")))
}

/// Reads title, organization, and any experience hint out of a result card's text.
/// The level is only taken from the metadata lines below the organization.
pub(super) fn parse_card(id: &str, card_text: &str) -> Option<Posting> {
    let mut lines = card_lines(card_text);
    let title = lines.next()?.to_string();
    // Cards repeat the title for screen readers.
    let organization = lines
        .find(|line| *line != title && !line.starts_with(&title))
        .unwrap_or_default()
        .to_string();
    let metadata: Vec<&str> = lines.collect();

    Some(Posting {
        id: PostingId::new(id),
        organization,
        experience: ExperienceLevel::detect(&metadata.join("\n")),
        title,
        applied_on_site: already_applied(card_text),
    })
}

/// First line of a form section with required markers stripped.
pub(super) fn clean_label(section_text: &str) -> String {
    card_lines(section_text)
        .next()
        .unwrap_or_default()
        .trim_end_matches('*')
        .trim()
        .to_string()
}

pub(super) fn marks_required(section_text: &str) -> bool {
    card_lines(section_text)
        .next()
        .is_some_and(|line| line.ends_with('*'))
        || card_lines(section_text).any(|line| line.eq_ignore_ascii_case("required"))
}

pub(super) fn is_placeholder_option(text: &str) -> bool {
    let trimmed = text.trim();
    trimmed.is_empty() || trimmed.eq_ignore_ascii_case(SELECT_PLACEHOLDER)
}

/// Login succeeded once the browser has left the login and checkpoint pages.
pub(super) fn login_state(current_url: &str) -> LoginState {
    if current_url.contains("/checkpoint") {
        LoginState::Challenged
    } else if current_url.contains("/login") || current_url.contains("/uas/") {
        LoginState::Pending
    } else {
        LoginState::SignedIn
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LoginState {
    Pending,
    Challenged,
    SignedIn,
}
