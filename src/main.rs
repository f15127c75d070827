//! Scrapyard - content-addressed build artifact cache
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use scrapyard::cli::commands::Context;
use scrapyard::cli::{Cli, Commands};
use scrapyard::config::{Config, ConfigManager};
use scrapyard::error::ScrapyardResult;
use std::process::ExitCode;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run() -> ScrapyardResult<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };
    let config = match config_manager.load().await {
        Ok(config) => config,
        Err(e) if cli.command.is_best_effort() => {
            init_logging(cli.verbose, &Config::default());
            warn!("Skipping, configuration unusable: {}", e);
            return Ok(ExitCode::SUCCESS);
        }
        Err(e) => return Err(e),
    };

    init_logging(cli.verbose, &config);

    let ctx = Context::new(cli.yard, config);

    // Dispatch to command
    match cli.command {
        Commands::Search(args) => scrapyard::cli::commands::search(args, &ctx).await,
        Commands::Store(args) => scrapyard::cli::commands::store(args, &ctx).await,
        Commands::Junk(args) => scrapyard::cli::commands::junk(args, &ctx).await,
        Commands::Crush => scrapyard::cli::commands::crush(&ctx).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug; RUST_LOG wins when set
fn init_logging(verbose: u8, config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("scrapyard=warn"),
        1 => EnvFilter::new("scrapyard=info"),
        _ => EnvFilter::new("scrapyard=debug"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if config.general.json_logs() {
        builder.json().init();
    } else {
        builder.without_time().init();
    }
}
