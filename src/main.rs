use anyhow::Result;
use clap::Parser;
use log::error;

use promptframe::cli::version_info;
use promptframe::{Cli, CommandHandler, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    // Handle version early
    if matches!(cli.command, Commands::Version) {
        println!("{}", version_info());
        return Ok(());
    }

    let handler = match CommandHandler::new(cli.config.clone(), cli.no_color) {
        Ok(h) => h,
        Err(e) => {
            error!("Failed to initialize promptframe: {e:#}");
            eprintln!("Error: Failed to initialize promptframe: {e:#}");
            eprintln!("Check the config file, or run 'promptframe init' to write a fresh one.");
            std::process::exit(1);
        }
    };

    match handler.handle_command(cli.command).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
        }
        Err(e) => {
            error!("Command failed: {e:#}");
            eprintln!("{}", handler.format_error(&format!("{e:#}")));
            std::process::exit(1);
        }
    }

    Ok(())
}
