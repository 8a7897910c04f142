use crate::cli::{ConfigArgs, RunArgs};
use crate::prompt::TerminalPrompt;
use apply_pilot::config::{AppConfig, Credentials, RunConfig};
use apply_pilot::error::AppError;
use apply_pilot::telemetry;
use apply_pilot::webdriver::{BrowserOptions, LinkedInDriver, LinkedInSettings, WebDriverClient};
use apply_pilot::workflows::easy_apply::{
    ApplicationLedger, FormFiller, Outcome, Pacer, PostingState, QuestionAnswerCache, RunSummary,
    StopSignal, UnknownQuestionPolicy,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Environment, telemetry, and the run document, with environment values layered on top.
fn load(args: &ConfigArgs) -> Result<RunConfig, AppError> {
    let app = AppConfig::load()?;
    telemetry::init(&app.telemetry)?;

    let path = args
        .config
        .clone()
        .unwrap_or_else(|| app.run_config_path.clone());
    let mut config = RunConfig::from_path(&path)?;
    info!(config = %path.display(), "loaded run configuration");

    if let Some(url) = app.webdriver_url {
        config.webdriver.url = url;
    }
    if config.profile.phone_number.is_none() {
        config.profile.phone_number = app.phone_number;
    }
    Ok(config)
}

fn spawn_stop_listener(stop: StopSignal) {
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("stop requested; finishing the current posting");
                stop.request();
            }
            Err(err) => warn!(error = %err, "unable to listen for ctrl-c"),
        }
    });
}

pub(crate) async fn run_applications(args: RunArgs) -> Result<(), AppError> {
    let mut config = load(&args.config)?;
    config.apply_overrides(args.overrides());

    let credentials = Credentials::from_env()?;
    let settings = LinkedInSettings::from_config(&config)?;
    let ledger = ApplicationLedger::open(config.storage.ledger_path.clone())?;
    let answers = QuestionAnswerCache::load(config.storage.answers_path.clone())?;
    info!(
        recorded = ledger.entries().len(),
        cached_answers = answers.len(),
        max_applications = config.run.max_applications,
        private = config.run.private_session,
        "starting run"
    );

    let options = BrowserOptions::new(config.run.private_session, config.webdriver.headless);
    let client = WebDriverClient::start(&config.webdriver.url, &options).await?;
    let pacer: Arc<dyn Pacer> = Arc::new(config.pacer());
    let driver = LinkedInDriver::new(client, credentials, settings).with_pacer(Arc::clone(&pacer));

    let stop = StopSignal::new();
    spawn_stop_listener(stop.clone());

    let mut filler = FormFiller::new(
        Arc::new(driver),
        pacer,
        config.eligibility_filter(),
        config.filler_config(),
    )
    .with_ledger(ledger)
    .with_answers(answers)
    .with_rules(config.answer_rules())
    .with_stop_signal(stop);
    if config.run.on_unknown_question == UnknownQuestionPolicy::Prompt {
        filler = filler.with_prompt(Box::new(TerminalPrompt));
    }

    let summary = filler.run().await?;
    if args.json {
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{json}"),
            Err(err) => warn!(error = %err, "unable to render summary as json"),
        }
    } else {
        render_summary(&summary);
    }
    Ok(())
}

fn render_summary(summary: &RunSummary) {
    println!("Run finished: {}", summary.stop_reason.label());
    println!("  Searches: {}", summary.searches);
    println!("  Postings seen: {}", summary.postings.len());
    for outcome in Outcome::ordered() {
        println!("  {:<20} {}", outcome.label(), summary.count(outcome));
    }
    for report in summary
        .postings
        .iter()
        .filter(|report| report.outcome == Outcome::Failed)
    {
        if let Some(reason) = report.trail.iter().rev().find_map(|state| match state {
            PostingState::Failed(reason) => Some(reason),
            _ => None,
        }) {
            println!("  failed {}: {}", report.posting_id, reason);
        }
    }
}

pub(crate) fn check_config(args: ConfigArgs) -> Result<(), AppError> {
    let config = load(&args)?;
    LinkedInSettings::from_config(&config)?;

    let bounds = config.experience_bounds();
    println!("Configuration OK");
    println!(
        "  Searches: {} keyword(s) x {} location(s), {} page(s) each",
        config.search.keywords.len(),
        config.search.locations.len(),
        config.search.pages
    );
    println!(
        "  Experience: {} to {}",
        bounds.min.map_or("any", |level| level.label()),
        bounds.max.map_or("any", |level| level.label())
    );
    println!(
        "  Blacklist: {} organization(s), {} title keyword(s)",
        config.eligibility.blacklist.len(),
        config.eligibility.blacklist_titles.len()
    );
    println!(
        "  Pacing: {:.1}s to {:.1}s",
        config.pacing.min_delay_secs, config.pacing.max_delay_secs
    );
    println!(
        "  Limit: {} application(s), unknown questions: {:?}",
        config.run.max_applications, config.run.on_unknown_question
    );
    println!("  Answer rules: {}", config.answer_rules().len());
    println!("  Ledger: {}", config.storage.ledger_path.display());
    println!("  Answers: {}", config.storage.answers_path.display());
    Ok(())
}

pub(crate) fn show_ledger(args: ConfigArgs) -> Result<(), AppError> {
    let config = load(&args)?;
    let ledger = ApplicationLedger::open(config.storage.ledger_path.clone())?;
    let totals = ledger.totals();

    println!(
        "Ledger {} ({} entries)",
        config.storage.ledger_path.display(),
        ledger.entries().len()
    );
    for outcome in Outcome::ordered() {
        println!(
            "  {:<20} {}",
            outcome.label(),
            totals.get(&outcome).copied().unwrap_or(0)
        );
    }
    if let Some(last) = ledger.entries().last() {
        println!(
            "  Last entry: {} {} at {} ({})",
            last.posting_id,
            last.outcome.label(),
            last.organization,
            last.recorded_at.to_rfc3339()
        );
    }
    Ok(())
}
