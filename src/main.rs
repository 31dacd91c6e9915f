mod commands;
mod render;
mod utils;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "confcal", version)]
#[command(about = "Mirror a conference agenda into a Google calendar")]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv). Also lists every planned change.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    log_format: LogFormat,

    /// Config file to use instead of ~/.config/confcal/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Debug, clap::ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape the agenda and bring the calendar in line with it
    Sync {
        /// Plan the changes without applying them
        #[arg(long)]
        dry_run: bool,
    },
    /// Show what a sync would change
    Status,
    /// Show config paths, creating a default config file if there is none
    Config,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli);

    let config_path = cli.config.as_deref();
    let verbose = cli.verbose > 0;

    let success = match cli.command {
        Commands::Sync { dry_run } => {
            let config = commands::load_config(config_path)?;
            commands::sync::run(&config, dry_run, verbose).await?
        }
        Commands::Status => {
            let config = commands::load_config(config_path)?;
            commands::status::run(&config, verbose).await?
        }
        Commands::Config => {
            commands::config::run(config_path)?;
            true
        }
    };

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Logs go to stderr so they never mix with the rendered plan on stdout.
fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "confcal=info",
        1 => "confcal=debug",
        _ => "confcal=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
