use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for postings, unique per site.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostingId(pub String);

impl PostingId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Seniority declared on a posting, ordered from most junior to most senior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    Internship,
    Entry,
    Associate,
    Mid,
    Senior,
    Director,
    Executive,
}

impl ExperienceLevel {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Internship,
            Self::Entry,
            Self::Associate,
            Self::Mid,
            Self::Senior,
            Self::Director,
            Self::Executive,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Internship => "Internship",
            Self::Entry => "Entry level",
            Self::Associate => "Associate",
            Self::Mid => "Mid level",
            Self::Senior => "Senior",
            Self::Director => "Director",
            Self::Executive => "Executive",
        }
    }

    /// Code used by the site's search filter. Mid and senior share the "Mid-Senior" bucket.
    pub const fn search_code(self) -> u8 {
        match self {
            Self::Internship => 1,
            Self::Entry => 2,
            Self::Associate => 3,
            Self::Mid | Self::Senior => 4,
            Self::Director => 5,
            Self::Executive => 6,
        }
    }

    /// Finds a level in card metadata. Only a line, or a `·`-separated part of one, that is
    /// exactly one of the site's level labels counts; words inside titles or names do not.
    pub fn detect(text: &str) -> Option<Self> {
        const SITE_LABELS: [(&str, ExperienceLevel); 8] = [
            ("internship", ExperienceLevel::Internship),
            ("entry level", ExperienceLevel::Entry),
            ("associate", ExperienceLevel::Associate),
            ("mid-senior level", ExperienceLevel::Mid),
            ("mid level", ExperienceLevel::Mid),
            ("senior level", ExperienceLevel::Senior),
            ("director", ExperienceLevel::Director),
            ("executive", ExperienceLevel::Executive),
        ];

        text.lines()
            .flat_map(|line| line.split(['·', '•']))
            .map(str::trim)
            .find_map(|segment| {
                SITE_LABELS
                    .iter()
                    .find(|(label, _)| segment.eq_ignore_ascii_case(label))
                    .map(|(_, level)| *level)
            })
    }
}

impl fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown experience level '{0}'")]
pub struct UnknownExperienceLevel(pub String);

impl FromStr for ExperienceLevel {
    type Err = UnknownExperienceLevel;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let cleaned = raw
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-'], " ")
            .trim_end_matches(" level")
            .to_string();

        match cleaned.as_str() {
            "internship" | "intern" => Ok(Self::Internship),
            "entry" | "junior" => Ok(Self::Entry),
            "associate" => Ok(Self::Associate),
            "mid" | "mid senior" | "intermediate" => Ok(Self::Mid),
            "senior" => Ok(Self::Senior),
            "director" => Ok(Self::Director),
            "executive" => Ok(Self::Executive),
            _ => Err(UnknownExperienceLevel(raw.to_string())),
        }
    }
}

/// A single job listing as read from a search result page. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub id: PostingId,
    pub organization: String,
    pub experience: Option<ExperienceLevel>,
    pub title: String,
    /// The site already shows this account's application on the card.
    #[serde(default)]
    pub applied_on_site: bool,
}

/// Final state recorded in the ledger for each attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    SkippedDuplicate,
    SkippedBlacklisted,
    SkippedIneligible,
    Failed,
}

impl Outcome {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Applied,
            Self::SkippedDuplicate,
            Self::SkippedBlacklisted,
            Self::SkippedIneligible,
            Self::Failed,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::SkippedDuplicate => "skipped_duplicate",
            Self::SkippedBlacklisted => "skipped_blacklisted",
            Self::SkippedIneligible => "skipped_ineligible",
            Self::Failed => "failed",
        }
    }
}

/// Input widget behind a form question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum QuestionKind {
    Text,
    Numeric,
    SingleChoice { options: Vec<String> },
    Typeahead,
    Unsupported { description: String },
}

/// A question on one step of an application form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormQuestion {
    /// Driver-assigned handle used to route the answer back to the right field.
    pub field_id: String,
    pub label: String,
    pub kind: QuestionKind,
    pub required: bool,
}

/// Answer handed back to the driver for a single field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilledAnswer {
    pub field_id: String,
    pub value: String,
}

/// What the driver observed after submitting a form step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormProgress {
    NextStep(Vec<FormQuestion>),
    Submitted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tags_and_site_labels() {
        assert_eq!("mid".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Mid));
        assert_eq!(
            "Mid-Senior level".parse::<ExperienceLevel>(),
            Ok(ExperienceLevel::Mid)
        );
        assert_eq!(
            "Entry level".parse::<ExperienceLevel>(),
            Ok(ExperienceLevel::Entry)
        );
        assert_eq!(" SENIOR ".parse::<ExperienceLevel>(), Ok(ExperienceLevel::Senior));
        assert!("wizard".parse::<ExperienceLevel>().is_err());
    }

    #[test]
    fn levels_are_ordered_by_seniority() {
        let ordered = ExperienceLevel::ordered();
        assert!(ordered.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(ExperienceLevel::Entry < ExperienceLevel::Mid);
    }

    #[test]
    fn detect_prefers_mid_senior_over_senior() {
        assert_eq!(
            ExperienceLevel::detect("Full-time · Mid-Senior level"),
            Some(ExperienceLevel::Mid)
        );
        assert_eq!(
            ExperienceLevel::detect("Remote\nEntry level"),
            Some(ExperienceLevel::Entry)
        );
        assert_eq!(ExperienceLevel::detect("Full-time"), None);
    }

    #[test]
    fn detect_ignores_level_words_inside_other_text() {
        assert_eq!(ExperienceLevel::detect("Executive Assistant"), None);
        assert_eq!(ExperienceLevel::detect("Smith & Associates"), None);
        assert_eq!(ExperienceLevel::detect("Director of Internship Programs"), None);
        assert_eq!(
            ExperienceLevel::detect("Hybrid · Associate"),
            Some(ExperienceLevel::Associate)
        );
    }
}
