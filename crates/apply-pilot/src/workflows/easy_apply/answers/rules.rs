use serde::{Deserialize, Serialize};

use super::super::normalizer::normalize_text;

/// Applicant details the standard rules draw their answers from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerProfile {
    pub phone_number: Option<String>,
    pub salary: Option<String>,
    pub rate: Option<String>,
    pub years_of_experience: Option<String>,
    /// Answer "Yes" to any remaining do/have/are/can-you question.
    pub affirm_yes_no_questions: bool,
}

/// Maps questions containing any of `patterns` to a fixed answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRule {
    pub patterns: Vec<String>,
    pub answer: String,
}

impl AnswerRule {
    pub fn new<P: Into<String>>(patterns: impl IntoIterator<Item = P>, answer: impl Into<String>) -> Self {
        Self {
            patterns: patterns.into_iter().map(Into::into).collect(),
            answer: answer.into(),
        }
    }

    fn matches(&self, normalized_question: &str) -> bool {
        self.patterns
            .iter()
            .map(|pattern| normalize_text(pattern))
            .any(|pattern| !pattern.is_empty() && normalized_question.contains(&pattern))
    }
}

/// Ordered rule list; the first matching rule wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerRules {
    rules: Vec<AnswerRule>,
}

impl AnswerRules {
    pub fn new(rules: Vec<AnswerRule>) -> Self {
        Self { rules }
    }

    /// Custom rules first, then the standard set derived from the profile.
    pub fn with_standard(custom: Vec<AnswerRule>, profile: &AnswerProfile) -> Self {
        let mut rules = custom;
        rules.extend(standard_rules(profile));
        Self { rules }
    }

    pub fn answer_for(&self, question: &str) -> Option<&str> {
        let normalized = normalize_text(question);
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .map(|rule| rule.answer.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn standard_rules(profile: &AnswerProfile) -> Vec<AnswerRule> {
    let mut rules = Vec::new();

    if let Some(phone) = &profile.phone_number {
        rules.push(AnswerRule::new(["mobile phone number", "phone number"], phone.clone()));
    }

    let years = profile
        .years_of_experience
        .clone()
        .unwrap_or_else(|| "3".to_string());
    rules.push(AnswerRule::new(["how many years", "years of experience"], years));
    rules.push(AnswerRule::new(["sponsor", "visa"], "No"));
    rules.push(AnswerRule::new(
        ["us citizen", "authorized", "legal right"],
        "Yes",
    ));

    let salary = match (&profile.salary, &profile.rate) {
        (Some(salary), Some(rate)) => format!("{salary} {rate}"),
        (Some(salary), None) => salary.clone(),
        _ => "Negotiable".to_string(),
    };
    rules.push(AnswerRule::new(["salary", "compensation"], salary));
    rules.push(AnswerRule::new(
        ["gender", "race", "lgbtq", "ethnicity", "nationality"],
        "Prefer not to say",
    ));
    rules.push(AnswerRule::new(["education", "degree"], "Bachelor's degree"));
    rules.push(AnswerRule::new(["when can you start", "start date"], "Immediately"));
    rules.push(AnswerRule::new(["willing to relocate"], "Yes"));

    if profile.affirm_yes_no_questions {
        rules.push(AnswerRule::new(
            ["do you ", "have you ", "are you ", "can you "],
            "Yes",
        ));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> AnswerProfile {
        AnswerProfile {
            phone_number: Some("555-0100".to_string()),
            salary: Some("100000".to_string()),
            rate: Some("per year".to_string()),
            years_of_experience: Some("5".to_string()),
            affirm_yes_no_questions: false,
        }
    }

    #[test]
    fn standard_rules_cover_common_questions() {
        let rules = AnswerRules::with_standard(Vec::new(), &profile());

        assert_eq!(
            rules.answer_for("How many years of work experience do you have with Rust?"),
            Some("5")
        );
        assert_eq!(
            rules.answer_for("Will you now or in the future require visa sponsorship?"),
            Some("No")
        );
        assert_eq!(
            rules.answer_for("What are your salary expectations?"),
            Some("100000 per year")
        );
        assert_eq!(rules.answer_for("Mobile phone number"), Some("555-0100"));
        assert_eq!(rules.answer_for("What is your favourite colour?"), None);
    }

    #[test]
    fn custom_rules_take_precedence() {
        let custom = vec![AnswerRule::new(["visa"], "Yes, H-1B transfer")];
        let rules = AnswerRules::with_standard(custom, &profile());

        assert_eq!(
            rules.answer_for("Do you require visa sponsorship?"),
            Some("Yes, H-1B transfer")
        );
    }

    #[test]
    fn blanket_yes_only_when_enabled() {
        let mut profile = profile();
        let rules = AnswerRules::with_standard(Vec::new(), &profile);
        assert_eq!(rules.answer_for("Do you have a driver's license?"), None);

        profile.affirm_yes_no_questions = true;
        let rules = AnswerRules::with_standard(Vec::new(), &profile);
        assert_eq!(rules.answer_for("Do you have a driver's license?"), Some("Yes"));
    }
}
