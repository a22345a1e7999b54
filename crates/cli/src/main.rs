use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tagreader_core::TagDispatcher;
use tagreader_pcsc::{PcscConfig, PcscDeviceManager, ShareMode};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod utils;

use commands::*;

#[derive(Parser)]
#[command(version, about = "Read loyalty cards and MIFARE Classic image tags over PC/SC")]
struct Cli {
    /// Optional reader name to use (all readers if not specified)
    #[arg(short, long)]
    reader: Option<String>,

    /// Debug level output
    #[arg(short, long)]
    verbose: bool,

    /// TOML file overriding the default reader configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available readers
    List,

    /// Wait for tags and run a session for each one
    Scan {
        /// Stop after the first tag
        #[arg(long)]
        once: bool,

        /// Connect to cards in exclusive mode
        #[arg(long)]
        exclusive: bool,
    },
}

fn main() -> eyre::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    match &cli.command {
        Commands::List => {
            let manager = PcscDeviceManager::new()?;
            list_command(&manager)?;
        }
        Commands::Scan { once, exclusive } => {
            let reader_config = config::load_config(cli.config.as_deref())?;
            info!(aid = %reader_config.aid, "Loaded reader configuration");

            let share_mode = if *exclusive {
                ShareMode::Exclusive
            } else {
                ShareMode::Shared
            };
            let manager =
                PcscDeviceManager::with_config(PcscConfig::new().with_share_mode(share_mode))?;
            if let Some(name) = &cli.reader {
                utils::reader::find_reader_by_name(&manager, name)?;
            }

            let dispatcher = TagDispatcher::new(reader_config);
            scan_command(&manager, &dispatcher, cli.reader.as_deref(), *once)?;
        }
    }

    Ok(())
}

fn log_filter(verbose: bool) -> EnvFilter {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    // RUST_LOG directives refine the default, they do not replace it
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

fn setup_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_ansi(true)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_log_filter_levels() {
        if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
            println!("Skipping test, RUST_LOG is set");
            return;
        }

        assert_eq!(log_filter(false).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(log_filter(true).max_level_hint(), Some(LevelFilter::DEBUG));
    }

    #[test]
    fn test_verbose_flag() {
        let cli = Cli::parse_from(["tagreader", "--verbose", "scan", "--once"]);
        assert!(cli.verbose);
        assert!(matches!(
            cli.command,
            Commands::Scan {
                once: true,
                exclusive: false
            }
        ));
    }
}
