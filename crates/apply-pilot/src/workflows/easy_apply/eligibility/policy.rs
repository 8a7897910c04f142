use serde::{Deserialize, Serialize};

use super::super::domain::{ExperienceLevel, Outcome, Posting};
use super::super::ledger::ApplicationLedger;
use super::rules::{Blacklist, BlacklistHit, ExperienceBounds};

/// What the run loop should do with a posting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Decision {
    Apply,
    SkipDuplicate,
    SkipBlacklisted(BlacklistHit),
    SkipIneligible { level: ExperienceLevel },
}

impl Decision {
    pub fn is_apply(&self) -> bool {
        matches!(self, Decision::Apply)
    }

    /// Ledger outcome for a skip; `None` for `Apply`, whose outcome is decided later.
    pub fn skip_outcome(&self) -> Option<Outcome> {
        match self {
            Decision::Apply => None,
            Decision::SkipDuplicate => Some(Outcome::SkippedDuplicate),
            Decision::SkipBlacklisted(_) => Some(Outcome::SkippedBlacklisted),
            Decision::SkipIneligible { .. } => Some(Outcome::SkippedIneligible),
        }
    }

    pub fn summary(&self) -> String {
        match self {
            Decision::Apply => "eligible".to_string(),
            Decision::SkipDuplicate => "already applied".to_string(),
            Decision::SkipBlacklisted(BlacklistHit::Organization(name)) => {
                format!("organization '{name}' is blacklisted")
            }
            Decision::SkipBlacklisted(BlacklistHit::TitleKeyword(keyword)) => {
                format!("title contains blacklisted keyword '{keyword}'")
            }
            Decision::SkipIneligible { level } => {
                format!("experience level '{}' outside configured bounds", level.label())
            }
        }
    }
}

/// First match wins: duplicate, blacklist, experience window, apply.
pub fn evaluate(
    posting: &Posting,
    ledger: &ApplicationLedger,
    blacklist: &Blacklist,
    bounds: &ExperienceBounds,
) -> Decision {
    if posting.applied_on_site || ledger.has_applied(&posting.id) {
        return Decision::SkipDuplicate;
    }

    if let Some(hit) = blacklist.matched_entry(posting) {
        return Decision::SkipBlacklisted(hit);
    }

    if let Some(level) = posting.experience {
        if !bounds.contains(level) {
            return Decision::SkipIneligible { level };
        }
    }

    Decision::Apply
}
