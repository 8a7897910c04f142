mod cli;
mod commands;
mod prompt;

use apply_pilot::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
