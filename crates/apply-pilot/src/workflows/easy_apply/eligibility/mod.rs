mod policy;
mod rules;

pub use policy::{evaluate, Decision};
pub use rules::{Blacklist, BlacklistHit, ExperienceBounds};

use super::domain::Posting;
use super::ledger::ApplicationLedger;

/// Run-scoped filter bundling the blacklist and experience window.
#[derive(Debug, Clone, Default)]
pub struct EligibilityFilter {
    blacklist: Blacklist,
    bounds: ExperienceBounds,
}

impl EligibilityFilter {
    pub fn new(blacklist: Blacklist, bounds: ExperienceBounds) -> Self {
        Self { blacklist, bounds }
    }

    pub fn evaluate(&self, posting: &Posting, ledger: &ApplicationLedger) -> Decision {
        evaluate(posting, ledger, &self.blacklist, &self.bounds)
    }

    pub fn bounds(&self) -> &ExperienceBounds {
        &self.bounds
    }
}
