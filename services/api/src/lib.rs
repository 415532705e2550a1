mod cli;
mod db;
mod infra;
mod routes;
mod server;
mod wizard;

use amc_directory::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
