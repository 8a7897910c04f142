use std::collections::BTreeMap;

use serde::Serialize;

use super::super::domain::{Outcome, PostingId};
use super::super::eligibility::Decision;

/// States a posting moves through during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PostingState {
    Discovered,
    Evaluated(Decision),
    Skipped(Outcome),
    Answering,
    Applied,
    Failed(String),
}

/// Per-posting trail kept for the run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingReport {
    pub posting_id: PostingId,
    pub outcome: Outcome,
    pub trail: Vec<PostingState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    LimitReached,
    Exhausted,
    StopRequested,
}

impl StopReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::LimitReached => "maximum application count reached",
            Self::Exhausted => "search results exhausted",
            Self::StopRequested => "stop requested",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub stop_reason: StopReason,
    pub searches: u32,
    pub postings: Vec<PostingReport>,
}

impl RunSummary {
    pub fn applied(&self) -> usize {
        self.count(Outcome::Applied)
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.postings
            .iter()
            .filter(|report| report.outcome == outcome)
            .count()
    }

    pub fn totals(&self) -> BTreeMap<Outcome, usize> {
        let mut totals = BTreeMap::new();
        for report in &self.postings {
            *totals.entry(report.outcome).or_insert(0) += 1;
        }
        totals
    }
}
