mod cli;
mod demo;
mod infra;
mod routes;
mod server;

use intern_eval::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
