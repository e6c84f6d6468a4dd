mod assess;
mod cli;
mod infra;
mod routes;
mod server;

use sleep_coach::error::AppError;

pub async fn run() -> Result<(), AppError> {
    cli::run().await
}
