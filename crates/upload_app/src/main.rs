mod app;
mod cli;
mod config;
mod input;
mod report;

use std::process::ExitCode;

use clap::Parser;
use upload_logging::upload_error;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    upload_logging::initialize(cli.log.into(), cli.log_level, &cli.log_file);

    match app::run(cli).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            upload_error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}
