mod cli;
mod deserialise;
mod download;
mod error;
mod glm;
mod logging;
mod parquet;
mod render;
mod s3;

use std::process::ExitCode;

use clap::Parser;
use cli::{command, Cli};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    match command::plot_day(&cli).await {
        Ok(filename) => {
            println!("File saved to `{}`", filename);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
