mod cli;
mod commands;
mod dashboard;
mod infra;
mod lifecycle;

use placement::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
