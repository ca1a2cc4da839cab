use clap::Parser;
use colored::Colorize;
use infrastructure::config::ConfigStore;
use presentation::cli::{Cli, CliApp};
use presentation::logging;
use shared::types::Result;
use tracing::level_filters::LevelFilter;

async fn run(cli: Cli) -> Result<i32> {
    let mut config = ConfigStore::load()?;
    let level = if cli.debug {
        LevelFilter::DEBUG
    } else {
        logging::level_for(&config.log_level()?)
    };
    logging::init(level);
    tracing::debug!("Config: {}", config.path().display());

    CliApp::new(config).run(cli).await
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("{} {:#}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    }
}
