use super::common::*;
use crate::workflows::easy_apply::domain::{ExperienceLevel, Outcome};
use crate::workflows::easy_apply::eligibility::{
    evaluate, Blacklist, BlacklistHit, Decision, ExperienceBounds,
};
use crate::workflows::easy_apply::ledger::{ApplicationLedger, LedgerEntry};

#[test]
fn scenario_postings_resolve_in_precedence_order() {
    let filter = scenario_filter();
    let ledger = ApplicationLedger::in_memory();
    let postings = [
        posting("1", "Acme", Some(ExperienceLevel::Mid)),
        posting("2", "Globex", Some(ExperienceLevel::Entry)),
        posting("3", "Globex", Some(ExperienceLevel::Senior)),
    ];

    let decisions: Vec<Decision> = postings
        .iter()
        .map(|posting| filter.evaluate(posting, &ledger))
        .collect();

    assert_eq!(
        decisions,
        vec![
            Decision::SkipBlacklisted(BlacklistHit::Organization("acme".to_string())),
            Decision::SkipIneligible {
                level: ExperienceLevel::Entry
            },
            Decision::Apply,
        ]
    );
}

#[test]
fn cards_the_site_marks_applied_are_duplicates() {
    let filter = scenario_filter();
    let mut marked = posting("4", "Acme", Some(ExperienceLevel::Entry));
    marked.applied_on_site = true;

    assert_eq!(
        filter.evaluate(&marked, &ApplicationLedger::in_memory()),
        Decision::SkipDuplicate
    );
}

#[test]
fn applied_postings_are_always_duplicates() {
    let blacklisted = posting("9", "Acme", Some(ExperienceLevel::Entry));
    let ledger = ApplicationLedger::from_entries([LedgerEntry::for_posting(
        &blacklisted,
        Outcome::Applied,
        "",
    )]);

    let decision = scenario_filter().evaluate(&blacklisted, &ledger);

    assert_eq!(decision, Decision::SkipDuplicate);
}

#[test]
fn failed_attempts_do_not_block_retries() {
    let retry = posting("4", "Initech", Some(ExperienceLevel::Mid));
    let ledger = ApplicationLedger::from_entries([
        LedgerEntry::for_posting(&retry, Outcome::Failed, "timeout"),
        LedgerEntry::for_posting(&retry, Outcome::SkippedIneligible, ""),
    ]);

    assert_eq!(scenario_filter().evaluate(&retry, &ledger), Decision::Apply);
}

#[test]
fn blacklist_matching_ignores_case_and_spacing_regardless_of_level() {
    let blacklist = Blacklist::organizations(["  acme   corp "]);
    let bounds = ExperienceBounds::between(ExperienceLevel::Mid, ExperienceLevel::Senior);
    let ledger = ApplicationLedger::in_memory();

    for level in ExperienceLevel::ordered() {
        let candidate = posting("5", "ACME Corp", Some(level));
        assert!(matches!(
            evaluate(&candidate, &ledger, &blacklist, &bounds),
            Decision::SkipBlacklisted(BlacklistHit::Organization(_))
        ));
    }

    let other = posting("6", "Acme Corporation", Some(ExperienceLevel::Mid));
    assert_eq!(evaluate(&other, &ledger, &blacklist, &bounds), Decision::Apply);
}

#[test]
fn title_keywords_blacklist_postings() {
    let blacklist = Blacklist::new(Vec::<String>::new(), ["Lead"]);
    let mut candidate = posting("7", "Globex", Some(ExperienceLevel::Mid));
    candidate.title = "Tech LEAD, Platform".to_string();

    let decision = evaluate(
        &candidate,
        &ApplicationLedger::in_memory(),
        &blacklist,
        &ExperienceBounds::default(),
    );

    assert_eq!(
        decision,
        Decision::SkipBlacklisted(BlacklistHit::TitleKeyword("lead".to_string()))
    );
    assert!(decision.summary().contains("lead"));
}

#[test]
fn out_of_bounds_levels_are_ineligible_and_undeclared_levels_pass() {
    let filter = scenario_filter();
    let ledger = ApplicationLedger::in_memory();

    for level in [
        ExperienceLevel::Internship,
        ExperienceLevel::Entry,
        ExperienceLevel::Associate,
        ExperienceLevel::Director,
        ExperienceLevel::Executive,
    ] {
        let candidate = posting("8", "Globex", Some(level));
        assert_eq!(
            filter.evaluate(&candidate, &ledger),
            Decision::SkipIneligible { level }
        );
    }

    let undeclared = posting("10", "Globex", None);
    assert_eq!(filter.evaluate(&undeclared, &ledger), Decision::Apply);
}

#[test]
fn open_bounds_accept_everything() {
    let bounds = ExperienceBounds::new(None, Some(ExperienceLevel::Associate));
    assert!(bounds.contains(ExperienceLevel::Internship));
    assert!(!bounds.contains(ExperienceLevel::Mid));
    assert_eq!(
        bounds.levels(),
        vec![
            ExperienceLevel::Internship,
            ExperienceLevel::Entry,
            ExperienceLevel::Associate
        ]
    );
    assert!(ExperienceBounds::default().is_open());
}

#[test]
fn decisions_map_to_ledger_outcomes() {
    assert_eq!(Decision::Apply.skip_outcome(), None);
    assert_eq!(
        Decision::SkipDuplicate.skip_outcome(),
        Some(Outcome::SkippedDuplicate)
    );
    assert_eq!(
        Decision::SkipIneligible {
            level: ExperienceLevel::Entry
        }
        .skip_outcome(),
        Some(Outcome::SkippedIneligible)
    );
}
