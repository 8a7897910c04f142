use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::super::domain::{ExperienceLevel, Posting};
use super::super::normalizer::normalize_text;

/// Organizations and title keywords the run must never apply to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blacklist {
    organizations: BTreeSet<String>,
    title_keywords: Vec<String>,
}

impl Blacklist {
    pub fn new<O, T>(organizations: O, title_keywords: T) -> Self
    where
        O: IntoIterator,
        O::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        Self {
            organizations: organizations
                .into_iter()
                .map(|name| normalize_text(name.as_ref()))
                .filter(|name| !name.is_empty())
                .collect(),
            title_keywords: title_keywords
                .into_iter()
                .map(|keyword| normalize_text(keyword.as_ref()))
                .filter(|keyword| !keyword.is_empty())
                .collect(),
        }
    }

    pub fn organizations<O>(organizations: O) -> Self
    where
        O: IntoIterator,
        O::Item: AsRef<str>,
    {
        Self::new(organizations, std::iter::empty::<&str>())
    }

    /// Returns the blacklist entry that rejects this posting, if any.
    pub fn matched_entry(&self, posting: &Posting) -> Option<BlacklistHit> {
        let organization = normalize_text(&posting.organization);
        if self.organizations.contains(&organization) {
            return Some(BlacklistHit::Organization(organization));
        }

        let title = normalize_text(&posting.title);
        self.title_keywords
            .iter()
            .find(|keyword| title.contains(keyword.as_str()))
            .map(|keyword| BlacklistHit::TitleKeyword(keyword.clone()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlacklistHit {
    Organization(String),
    TitleKeyword(String),
}

/// Inclusive experience window; `None` on either side leaves it open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperienceBounds {
    pub min: Option<ExperienceLevel>,
    pub max: Option<ExperienceLevel>,
}

impl ExperienceBounds {
    pub fn new(min: Option<ExperienceLevel>, max: Option<ExperienceLevel>) -> Self {
        Self { min, max }
    }

    pub fn between(min: ExperienceLevel, max: ExperienceLevel) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn contains(&self, level: ExperienceLevel) -> bool {
        self.min.map_or(true, |min| level >= min) && self.max.map_or(true, |max| level <= max)
    }

    /// Levels inside the window, used to narrow the site's own search filter.
    pub fn levels(&self) -> Vec<ExperienceLevel> {
        ExperienceLevel::ordered()
            .into_iter()
            .filter(|level| self.contains(*level))
            .collect()
    }

    pub fn is_open(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}
