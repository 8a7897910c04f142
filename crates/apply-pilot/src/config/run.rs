use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};

use super::ConfigError;
use crate::workflows::easy_apply::{
    AnswerProfile, AnswerRule, AnswerRules, Blacklist, EligibilityFilter, ExperienceBounds,
    ExperienceLevel, FillerConfig, RandomPacer, RetryPolicy, UnknownQuestionPolicy,
};

/// Multiplier applied to both pacing bounds when slower pacing is requested.
pub const SLOW_PACING_FACTOR: f64 = 2.0;

/// Run configuration document, loaded once at startup and read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    pub search: SearchSection,
    #[serde(default)]
    pub eligibility: EligibilitySection,
    #[serde(default)]
    pub pacing: PacingSection,
    #[serde(default)]
    pub run: RunSection,
    #[serde(default)]
    pub profile: AnswerProfile,
    #[serde(default)]
    pub uploads: UploadsSection,
    #[serde(default)]
    pub answers: AnswersSection,
    #[serde(default)]
    pub storage: StorageSection,
    #[serde(default)]
    pub webdriver: WebDriverSection,
    #[serde(default)]
    pub retry: RetryPolicy,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchSection {
    pub keywords: Vec<String>,
    pub locations: Vec<String>,
    #[serde(default = "default_pages")]
    pub pages: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EligibilitySection {
    #[serde(deserialize_with = "deserialize_level")]
    pub min_experience: Option<ExperienceLevel>,
    #[serde(deserialize_with = "deserialize_level")]
    pub max_experience: Option<ExperienceLevel>,
    pub blacklist: Vec<String>,
    pub blacklist_titles: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingSection {
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
}

impl Default for PacingSection {
    fn default() -> Self {
        Self {
            min_delay_secs: 2.0,
            max_delay_secs: 5.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunSection {
    pub max_applications: u32,
    pub private_session: bool,
    pub max_form_steps: u32,
    pub on_unknown_question: UnknownQuestionPolicy,
    pub default_answer: Option<String>,
}

impl Default for RunSection {
    fn default() -> Self {
        Self {
            max_applications: 10,
            private_session: false,
            max_form_steps: 8,
            on_unknown_question: UnknownQuestionPolicy::Abandon,
            default_answer: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadsSection {
    pub resume: Option<PathBuf>,
    pub cover_letter: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnswersSection {
    pub use_standard_rules: bool,
    pub rules: Vec<AnswerRule>,
}

impl Default for AnswersSection {
    fn default() -> Self {
        Self {
            use_standard_rules: true,
            rules: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub ledger_path: PathBuf,
    pub answers_path: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("applications.csv"),
            answers_path: PathBuf::from("qa.csv"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WebDriverSection {
    pub url: String,
    pub headless: bool,
    pub wait_timeout_secs: u64,
}

impl Default for WebDriverSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:9515".to_string(),
            headless: false,
            wait_timeout_secs: 30,
        }
    }
}

/// The only run parameters exposed on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOverrides {
    pub max_applications: Option<u32>,
    pub private_session: Option<bool>,
    pub slow: bool,
}

impl RunConfig {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&raw, &path.display().to_string())
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Self::parse(raw, "<inline>")
    }

    fn parse(raw: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: RunConfig = toml::from_str(raw).map_err(|source| ConfigError::Parse {
            origin: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects documents that would only fail once the browser is already open.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| Err(ConfigError::Invalid(reason.to_string()));

        if self.search.keywords.iter().all(|k| k.trim().is_empty()) {
            return invalid("search.keywords must list at least one search term");
        }
        if self.search.locations.iter().all(|l| l.trim().is_empty()) {
            return invalid("search.locations must list at least one location");
        }
        if self.search.pages == 0 {
            return invalid("search.pages must be at least 1");
        }

        if let (Some(min), Some(max)) = (
            self.eligibility.min_experience,
            self.eligibility.max_experience,
        ) {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "eligibility.min_experience ({}) is above max_experience ({})",
                    min.label(),
                    max.label()
                )));
            }
        }

        let pacing = &self.pacing;
        if !pacing.min_delay_secs.is_finite()
            || !pacing.max_delay_secs.is_finite()
            || pacing.min_delay_secs < 0.0
            || pacing.max_delay_secs < 0.0
        {
            return invalid("pacing delays must be non-negative numbers");
        }
        if pacing.min_delay_secs > pacing.max_delay_secs {
            return invalid("pacing.min_delay_secs must not exceed pacing.max_delay_secs");
        }

        if self.run.max_applications == 0 {
            return invalid("run.max_applications must be at least 1");
        }
        if self.run.max_form_steps == 0 {
            return invalid("run.max_form_steps must be at least 1");
        }
        if self.run.on_unknown_question == UnknownQuestionPolicy::Default
            && self
                .run
                .default_answer
                .as_deref()
                .map_or(true, |answer| answer.trim().is_empty())
        {
            return invalid("run.default_answer is required when on_unknown_question = \"default\"");
        }

        if let Some(rule) = self
            .answers
            .rules
            .iter()
            .find(|rule| rule.patterns.iter().all(|p| p.trim().is_empty()))
        {
            return Err(ConfigError::Invalid(format!(
                "answer rule for '{}' has no patterns",
                rule.answer
            )));
        }

        if self.retry.max_attempts == 0 {
            return invalid("retry.max_attempts must be at least 1");
        }

        Ok(())
    }

    pub fn apply_overrides(&mut self, overrides: RunOverrides) {
        if let Some(max) = overrides.max_applications {
            self.run.max_applications = max.max(1);
        }
        if let Some(private) = overrides.private_session {
            self.run.private_session = private;
        }
        if overrides.slow {
            self.pacing.min_delay_secs *= SLOW_PACING_FACTOR;
            self.pacing.max_delay_secs *= SLOW_PACING_FACTOR;
        }
    }

    pub fn experience_bounds(&self) -> ExperienceBounds {
        ExperienceBounds::new(
            self.eligibility.min_experience,
            self.eligibility.max_experience,
        )
    }

    pub fn eligibility_filter(&self) -> EligibilityFilter {
        EligibilityFilter::new(
            Blacklist::new(
                &self.eligibility.blacklist,
                &self.eligibility.blacklist_titles,
            ),
            self.experience_bounds(),
        )
    }

    pub fn answer_rules(&self) -> AnswerRules {
        let custom = self.answers.rules.clone();
        if self.answers.use_standard_rules {
            AnswerRules::with_standard(custom, &self.profile)
        } else {
            AnswerRules::new(custom)
        }
    }

    pub fn pacer(&self) -> RandomPacer {
        RandomPacer::from_secs(self.pacing.min_delay_secs, self.pacing.max_delay_secs)
    }

    pub fn filler_config(&self) -> FillerConfig {
        FillerConfig {
            keywords: non_blank(&self.search.keywords),
            locations: non_blank(&self.search.locations),
            pages_per_search: self.search.pages,
            max_applications: self.run.max_applications,
            max_form_steps: self.run.max_form_steps,
            unknown_question: self.run.on_unknown_question,
            default_answer: self.run.default_answer.clone(),
            retry: self.retry,
        }
    }
}

fn non_blank(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .collect()
}

fn default_pages() -> u32 {
    4
}

fn deserialize_level<'de, D>(deserializer: D) -> Result<Option<ExperienceLevel>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| value.parse().map_err(serde::de::Error::custom))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::easy_apply::{ApplicationLedger, Decision, Posting, PostingId};

    const SAMPLE: &str = r#"
[search]
keywords = ["Software Engineer", "Data Scientist"]
locations = ["United States", "Remote"]

[eligibility]
min_experience = "mid"
max_experience = "senior"
blacklist = ["Acme"]
blacklist_titles = ["Lead"]

[pacing]
min_delay_secs = 1.5
max_delay_secs = 3.0

[run]
max_applications = 5
private_session = true
on_unknown_question = "default"
default_answer = "Yes"

[profile]
phone_number = "555-0100"
salary = "100000"
rate = "per year"

[[answers.rules]]
patterns = ["notice period"]
answer = "2 weeks"
"#;

    #[test]
    fn parses_full_document() {
        let config = RunConfig::from_toml_str(SAMPLE).expect("sample parses");

        assert_eq!(config.search.pages, 4);
        assert_eq!(config.eligibility.min_experience, Some(ExperienceLevel::Mid));
        assert_eq!(config.run.on_unknown_question, UnknownQuestionPolicy::Default);
        assert_eq!(config.storage.ledger_path, PathBuf::from("applications.csv"));
        assert_eq!(config.webdriver.url, "http://localhost:9515");
        assert_eq!(config.retry, RetryPolicy::default());

        let rules = config.answer_rules();
        assert_eq!(rules.answer_for("What is your notice period?"), Some("2 weeks"));
        assert_eq!(rules.answer_for("Mobile phone number"), Some("555-0100"));

        let filler = config.filler_config();
        assert_eq!(filler.keywords.len(), 2);
        assert_eq!(filler.max_applications, 5);
    }

    #[test]
    fn eligibility_filter_reflects_document() {
        let config = RunConfig::from_toml_str(SAMPLE).unwrap();
        let filter = config.eligibility_filter();
        let posting = Posting {
            id: PostingId::new("1"),
            organization: "ACME".to_string(),
            experience: Some(ExperienceLevel::Mid),
            title: "Engineer".to_string(),
            applied_on_site: false,
        };

        assert!(matches!(
            filter.evaluate(&posting, &ApplicationLedger::in_memory()),
            Decision::SkipBlacklisted(_)
        ));
    }

    #[test]
    fn overrides_adjust_limits_and_pacing() {
        let mut config = RunConfig::from_toml_str(SAMPLE).unwrap();
        config.apply_overrides(RunOverrides {
            max_applications: Some(2),
            private_session: Some(false),
            slow: true,
        });

        assert_eq!(config.run.max_applications, 2);
        assert!(!config.run.private_session);
        assert_eq!(config.pacing.min_delay_secs, 3.0);
        assert_eq!(config.pacing.max_delay_secs, 6.0);
    }

    #[test]
    fn rejects_inverted_experience_bounds() {
        let raw = SAMPLE.replace(
            "min_experience = \"mid\"",
            "min_experience = \"director\"",
        );
        match RunConfig::from_toml_str(&raw) {
            Err(ConfigError::Invalid(reason)) => assert!(reason.contains("min_experience")),
            other => panic!("expected invalid bounds, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_experience_tags() {
        let raw = SAMPLE.replace("max_experience = \"senior\"", "max_experience = \"guru\"");
        assert!(matches!(
            RunConfig::from_toml_str(&raw),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn default_policy_requires_default_answer() {
        let raw = SAMPLE.replace("default_answer = \"Yes\"\n", "");
        match RunConfig::from_toml_str(&raw) {
            Err(ConfigError::Invalid(reason)) => assert!(reason.contains("default_answer")),
            other => panic!("expected missing default answer, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_search_terms() {
        let raw = r#"
[search]
keywords = []
locations = ["Remote"]
"#;
        assert!(matches!(
            RunConfig::from_toml_str(raw),
            Err(ConfigError::Invalid(_))
        ));

        assert!(matches!(
            RunConfig::from_toml_str("[run]\nmax_applications = 3\n"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn rejects_inverted_pacing() {
        let raw = SAMPLE.replace("min_delay_secs = 1.5", "min_delay_secs = 9.0");
        assert!(matches!(
            RunConfig::from_toml_str(&raw),
            Err(ConfigError::Invalid(_))
        ));
    }
}
