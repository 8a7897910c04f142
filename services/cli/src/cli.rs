use crate::commands::{check_config, run_applications, show_ledger};
use apply_pilot::config::RunOverrides;
use apply_pilot::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "apply-pilot",
    about = "Search a job board and submit Easy Apply applications from a saved configuration",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in, search, and apply to eligible postings
    Run(RunArgs),
    /// Validate the run configuration without opening a browser
    Check(ConfigArgs),
    /// Print per-outcome totals from the application ledger
    Ledger(ConfigArgs),
}

#[derive(Args, Debug, Default, Clone)]
pub(crate) struct ConfigArgs {
    /// Run configuration file (defaults to APPLY_PILOT_CONFIG, then apply-pilot.toml)
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RunArgs {
    #[command(flatten)]
    pub(crate) config: ConfigArgs,
    /// Stop after this many submitted applications
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub(crate) max_applications: Option<u32>,
    /// Use a private (incognito) browser session
    #[arg(long, conflicts_with = "no_private")]
    pub(crate) private: bool,
    /// Use a regular browser session even if the configuration asks for a private one
    #[arg(long = "no-private")]
    pub(crate) no_private: bool,
    /// Double the configured delays between interactions
    #[arg(long)]
    pub(crate) slow: bool,
    /// Print the run summary as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl RunArgs {
    pub(crate) fn overrides(&self) -> RunOverrides {
        let private_session = if self.private {
            Some(true)
        } else if self.no_private {
            Some(false)
        } else {
            None
        };

        RunOverrides {
            max_applications: self.max_applications,
            private_session,
            slow: self.slow,
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => run_applications(args).await,
        Command::Check(args) => check_config(args),
        Command::Ledger(args) => show_ledger(args),
    }
}
